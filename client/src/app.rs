// Chat Client - 组装根
//
// 将配置、存储、对话、推送、人格与主题连接在一起

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::infrastructure::{ClientEvent, EventBus};
use crate::modules::chat::application::{ConversationController, SendOutcome};
use crate::modules::chat::domain::SessionId;
use crate::modules::chat::infrastructure::HttpChatService;
use crate::modules::chat::ports::{ChatServicePort, RenderPort};
use crate::modules::config::ClientConfig;
use crate::modules::notification::infrastructure::SocketIoTransport;
use crate::modules::notification::{
    ConnectionState, MessageHandler, NotificationChannel, PushTransport, StatusHandler,
};
use crate::modules::persona::{HttpPersonaDirectory, PersonaDirectoryPort, PersonaSelector};
use crate::modules::storage::{FileKeyValueStore, KeyValueStore};
use crate::modules::theme::{ThemeController, ThemeSurface};
use crate::shared::AppResult;

/// 推送载荷转为显示文本
///
/// 字符串原样显示；对象取 `content` 或 `message` 字段；其余情况显示紧凑 JSON
pub fn care_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["content", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| payload.to_string()),
        other => other.to_string(),
    }
}

/// 客户端依赖的全部端口
pub struct ClientPorts {
    pub config: ClientConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub chat_service: Arc<dyn ChatServicePort>,
    pub directory: Arc<dyn PersonaDirectoryPort>,
    pub transport: Arc<dyn PushTransport>,
    pub renderer: Arc<dyn RenderPort>,
    pub surface: Arc<dyn ThemeSurface>,
}

/// 客户端容器
///
/// 管理各模块之间的依赖注入
pub struct ChatClient {
    config: ClientConfig,
    events: EventBus,
    renderer: Arc<dyn RenderPort>,
    conversation: Arc<ConversationController>,
    personas: Arc<PersonaSelector>,
    theme: ThemeController,
    channel: NotificationChannel,
}

impl ChatClient {
    /// 使用 HTTP、WebSocket 与文件存储创建客户端
    ///
    /// # Arguments
    /// * `config` - 已加载的客户端配置
    /// * `renderer` - 同时承担消息渲染与主题显示的界面
    pub async fn bootstrap<R>(config: ClientConfig, renderer: Arc<R>) -> AppResult<Self>
    where
        R: RenderPort + ThemeSurface + 'static,
    {
        config.validate()?;
        let timeout = config.request_timeout();

        let ports = ClientPorts {
            store: Arc::new(FileKeyValueStore::new(&config.data_dir)),
            chat_service: Arc::new(HttpChatService::new(config.chat_url(), timeout)?),
            directory: Arc::new(HttpPersonaDirectory::new(config.personas_url(), timeout)?),
            transport: Arc::new(SocketIoTransport::from_config(&config)),
            renderer: renderer.clone(),
            surface: renderer,
            config,
        };

        Self::with_ports(ports).await
    }

    /// 使用自定义端口创建客户端
    pub async fn with_ports(ports: ClientPorts) -> AppResult<Self> {
        let ClientPorts {
            config,
            store,
            chat_service,
            directory,
            transport,
            renderer,
            surface,
        } = ports;
        let events = EventBus::new();

        let personas = Arc::new(
            PersonaSelector::new(
                directory,
                store.clone(),
                events.clone(),
                config.default_persona_id.clone(),
            )
            .await,
        );

        let conversation = Arc::new(ConversationController::new(
            chat_service,
            renderer.clone(),
            personas.clone(),
            events.clone(),
            config.reveal_speed(),
        ));

        let theme = ThemeController::new(store, surface, events.clone());

        let on_status: StatusHandler = {
            let renderer = renderer.clone();
            let events = events.clone();
            Arc::new(move |connected| {
                renderer.set_connection_status(connected);
                events.publish(ClientEvent::ConnectionChanged {
                    state: ConnectionState::from(connected),
                });
            })
        };
        let on_message: MessageHandler = {
            let conversation = conversation.clone();
            Arc::new(move |payload| {
                conversation.receive_care_message(&care_text(&payload));
            })
        };
        let channel = NotificationChannel::new(transport, config.ws_endpoint(), on_status)
            .with_message_handler(on_message)
            .with_care_event(config.care_event.clone())
            .with_registration(config.register_on_connect);

        Ok(Self {
            config,
            events,
            renderer,
            conversation,
            personas,
            theme,
            channel,
        })
    }

    /// 应用主题、加载人格并打开推送通道
    pub async fn start(&self) -> AppResult<()> {
        self.theme.init().await?;
        self.personas.load_personas().await;
        self.renderer.set_connection_status(false);
        self.renderer
            .set_message_count(self.conversation.message_count());
        self.channel.connect(self.session_id()).await?;
        info!("[ChatClient] Started with session {}", self.session_id());
        Ok(())
    }

    /// 关闭推送通道
    pub async fn shutdown(&self) {
        self.channel.disconnect().await;
        info!("[ChatClient] Shut down");
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        self.conversation.send_message(text).await
    }

    pub fn session_id(&self) -> &SessionId {
        self.conversation.session_id()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn conversation(&self) -> &Arc<ConversationController> {
        &self.conversation
    }

    pub fn personas(&self) -> &Arc<PersonaSelector> {
        &self.personas
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }
}
