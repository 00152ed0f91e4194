use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ChannelError, ConnectionState, PushTransport, TransportEvent};
use crate::modules::chat::domain::SessionId;

/// 默认的关怀消息事件名
pub const CARE_EVENT: &str = "care_message";

/// 连接后发送的注册事件名
pub const REGISTER_EVENT: &str = "register";

/// 连接参数中携带会话 ID 的键
pub const SESSION_PARAM: &str = "session_id";

/// 连接状态回调
pub type StatusHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// 推送消息回调，载荷原样转交
pub type MessageHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// 推送通道
///
/// 状态只由传输事件驱动：Connected / Reconnected 置为已连接，
/// Disconnected 置为未连接
pub struct NotificationChannel {
    transport: Arc<dyn PushTransport>,
    endpoint: String,
    care_event: String,
    register_on_connect: bool,
    connected: Arc<AtomicBool>,
    on_status: StatusHandler,
    on_message: Option<MessageHandler>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationChannel {
    pub fn new(
        transport: Arc<dyn PushTransport>,
        endpoint: impl Into<String>,
        on_status: StatusHandler,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            care_event: CARE_EVENT.to_string(),
            register_on_connect: false,
            connected: Arc::new(AtomicBool::new(false)),
            on_status,
            on_message: None,
            dispatcher: Mutex::new(None),
        }
    }

    /// 设置推送消息回调
    pub fn with_message_handler(mut self, handler: MessageHandler) -> Self {
        self.on_message = Some(handler);
        self
    }

    /// 设置推送事件名
    pub fn with_care_event(mut self, event: impl Into<String>) -> Self {
        self.care_event = event.into();
        self
    }

    /// 每次连接/重连后发送 `register {user_id}`
    pub fn with_registration(mut self, enabled: bool) -> Self {
        self.register_on_connect = enabled;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 打开通道，会话 ID 作为连接参数
    pub async fn connect(&self, session_id: &SessionId) -> Result<(), ChannelError> {
        let params = vec![(SESSION_PARAM.to_string(), session_id.to_string())];
        let events = self.transport.connect(&self.endpoint, &params).await?;
        info!("[NotificationChannel] Connecting to {}", self.endpoint);

        let dispatcher = Dispatcher {
            transport: self.transport.clone(),
            care_event: self.care_event.clone(),
            registration: self
                .register_on_connect
                .then(|| json!({ "user_id": session_id.as_str() })),
            connected: self.connected.clone(),
            on_status: self.on_status.clone(),
            on_message: self.on_message.clone(),
        };
        let handle = tokio::spawn(dispatcher.run(events));

        let previous = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    /// 已连接时发送事件，未连接时静默丢弃
    pub async fn send(&self, event: &str, data: Value) {
        if !self.is_connected() {
            debug!("[NotificationChannel] Dropping '{}' while disconnected", event);
            return;
        }
        if let Err(e) = self.transport.emit(event, data).await {
            warn!("[NotificationChannel] Failed to emit '{}': {}", event, e);
        }
    }

    /// 最近一次已知的连接状态
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.is_connected())
    }

    /// 关闭通道
    pub async fn disconnect(&self) {
        let handle = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.transport.close().await;
        if self.connected.swap(false, Ordering::AcqRel) {
            (self.on_status)(false);
        }
        info!("[NotificationChannel] Disconnected");
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        if let Some(handle) = self
            .dispatcher
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

/// 传输事件分发任务
struct Dispatcher {
    transport: Arc<dyn PushTransport>,
    care_event: String,
    registration: Option<Value>,
    connected: Arc<AtomicBool>,
    on_status: StatusHandler,
    on_message: Option<MessageHandler>,
}

impl Dispatcher {
    async fn run(self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Connected | TransportEvent::Reconnected => {
                    info!("[NotificationChannel] {:?}", event);
                    self.connected.store(true, Ordering::Release);
                    if let Some(payload) = &self.registration {
                        if let Err(e) = self.transport.emit(REGISTER_EVENT, payload.clone()).await
                        {
                            warn!("[NotificationChannel] Registration failed: {}", e);
                        }
                    }
                    (self.on_status)(true);
                }
                TransportEvent::Disconnected => {
                    info!("[NotificationChannel] Disconnected by transport");
                    self.connected.store(false, Ordering::Release);
                    (self.on_status)(false);
                }
                TransportEvent::Event { name, payload } if name == self.care_event => {
                    debug!("[NotificationChannel] Push '{}' received", name);
                    if let Some(handler) = &self.on_message {
                        handler(payload);
                    }
                }
                TransportEvent::Event { name, .. } => {
                    debug!("[NotificationChannel] Ignoring event '{}'", name);
                }
            }
        }
        debug!("[NotificationChannel] Transport event stream ended");
    }
}
