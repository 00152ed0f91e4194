use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::infrastructure::{ClientEvent, EventBus};
use crate::modules::chat::domain::{
    EmotionIndicator, EmotionSnapshot, Message, MessageId, RenderState, Session, SessionId,
};
use crate::modules::chat::ports::{ChatRequest, ChatServicePort, PersonaProvider, RenderPort};
use crate::shared::current_time;

/// 服务端返回非成功状态时显示的文本
pub const SERVER_FAILURE_TEXT: &str = "AI未能回复，请稍后再试";

/// 网络或响应解析失败时显示的文本
pub const NETWORK_FAILURE_TEXT: &str = "网络错误，请检查连接";

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 服务端逻辑失败
    Server,
    /// 传输失败
    Transport,
}

impl FailureKind {
    pub fn text(&self) -> &'static str {
        match self {
            FailureKind::Server => SERVER_FAILURE_TEXT,
            FailureKind::Transport => NETWORK_FAILURE_TEXT,
        }
    }
}

/// 被忽略的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 输入为空或只有空白
    EmptyInput,
    /// 已有请求在进行中
    Busy,
}

/// 一次发送的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Ignored(IgnoreReason),
    Replied {
        reply: String,
        emotion: Option<EmotionSnapshot>,
    },
    Failed(FailureKind),
}

/// 进行中标志的占用凭证，离开作用域时释放
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 对话控制器
///
/// 同一实例最多一个进行中的请求。推送消息走独立的渲染路径，不受该限制
pub struct ConversationController {
    session: Session,
    chat_service: Arc<dyn ChatServicePort>,
    renderer: Arc<dyn RenderPort>,
    personas: Arc<dyn PersonaProvider>,
    events: EventBus,
    reveal_speed: Duration,
    in_flight: AtomicBool,
    last_emotion: Mutex<Option<EmotionSnapshot>>,
}

impl ConversationController {
    /// 创建控制器并生成新会话
    pub fn new(
        chat_service: Arc<dyn ChatServicePort>,
        renderer: Arc<dyn RenderPort>,
        personas: Arc<dyn PersonaProvider>,
        events: EventBus,
        reveal_speed: Duration,
    ) -> Self {
        Self::with_session(
            Session::new(),
            chat_service,
            renderer,
            personas,
            events,
            reveal_speed,
        )
    }

    pub fn with_session(
        session: Session,
        chat_service: Arc<dyn ChatServicePort>,
        renderer: Arc<dyn RenderPort>,
        personas: Arc<dyn PersonaProvider>,
        events: EventBus,
        reveal_speed: Duration,
    ) -> Self {
        info!("[ConversationController] Session {}", session.id());
        Self {
            session,
            chat_service,
            renderer,
            personas,
            events,
            reveal_speed,
            in_flight: AtomicBool::new(false),
            last_emotion: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.session.id()
    }

    pub fn message_count(&self) -> u64 {
        self.session.message_count()
    }

    /// 覆盖消息计数并刷新显示
    pub fn set_message_count(&self, count: u64) {
        self.session.set_message_count(count);
        self.renderer.set_message_count(count);
    }

    /// 是否有请求在进行中
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 最近一次显示的情感快照
    pub fn last_emotion(&self) -> Option<EmotionSnapshot> {
        self.last_emotion
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 发送用户消息
    ///
    /// 空输入或已有请求进行中时不做任何渲染。其余情况依次渲染用户消息、
    /// 助手占位，然后以逐字回复或两种固定失败文本之一结束
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            debug!("[ConversationController] Ignoring empty input");
            return SendOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("[ConversationController] Request in flight, ignoring input");
            return SendOutcome::Ignored(IgnoreReason::Busy);
        };

        let user_message = Message::new_user(content);
        self.renderer.render_message(&user_message);
        self.renderer.mark_sent(user_message.id(), &current_time());
        let count = self.session.increment_message_count();
        self.renderer.set_message_count(count);
        self.events.publish(ClientEvent::MessageSent {
            session_id: self.session.id().clone(),
            message_id: user_message.id(),
            content: content.to_string(),
        });

        let placeholder = Message::new_placeholder();
        self.renderer.render_message(&placeholder);

        let persona_id = self.personas.current_persona_id().await;
        let request = ChatRequest::new(content, self.session.id(), persona_id);

        match self.chat_service.send(request).await {
            Ok(response) if response.is_success() => match response.reply {
                Some(reply) => {
                    self.renderer
                        .reveal_text(placeholder.id(), &reply, self.reveal_speed)
                        .await;
                    self.update_emotion_display(response.emotion.as_ref());
                    info!(
                        "[ConversationController] Reply revealed ({} chars)",
                        reply.chars().count()
                    );
                    self.events.publish(ClientEvent::ReplyRevealed {
                        message_id: placeholder.id(),
                        reply: reply.clone(),
                        emotion: response.emotion.clone(),
                    });
                    SendOutcome::Replied {
                        reply,
                        emotion: response.emotion,
                    }
                }
                // 服务端已应答但缺少 reply，归为服务端失败而非网络错误
                None => {
                    warn!("[ConversationController] Success status without reply");
                    self.fail(placeholder.id(), FailureKind::Server)
                }
            },
            Ok(response) => {
                warn!(
                    "[ConversationController] Server failure: status={:?} error={:?}",
                    response.status, response.error
                );
                self.fail(placeholder.id(), FailureKind::Server)
            }
            Err(e) => {
                warn!("[ConversationController] Transport failure: {}", e);
                self.fail(placeholder.id(), FailureKind::Transport)
            }
        }
    }

    fn fail(&self, placeholder: MessageId, kind: FailureKind) -> SendOutcome {
        self.renderer
            .update_message(placeholder, kind.text(), RenderState::Final);
        self.events.publish(ClientEvent::ReplyFailed {
            message_id: placeholder,
            kind,
        });
        SendOutcome::Failed(kind)
    }

    /// 渲染推送下来的关怀消息，可与进行中的请求并发
    pub fn receive_care_message(&self, text: &str) -> MessageId {
        let message = Message::new_push(text);
        self.renderer.render_message(&message);
        debug!("[ConversationController] Care message rendered");
        self.events.publish(ClientEvent::CareMessageReceived {
            message_id: message.id(),
            content: text.to_string(),
        });
        message.id()
    }

    /// 更新情绪指示器，None 时隐藏
    pub fn update_emotion_display(&self, snapshot: Option<&EmotionSnapshot>) {
        let indicator = snapshot.map(EmotionIndicator::from);
        self.renderer.set_emotion_indicator(indicator.as_ref());
        *self.last_emotion.lock().unwrap_or_else(|e| e.into_inner()) = snapshot.cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::domain::{Sender, DEFAULT_EMOTION_ICON, PLACEHOLDER_TEXT};
    use crate::modules::chat::infrastructure::RecordingRenderer;
    use crate::modules::chat::ports::{ChatResponse, ChatServiceError, FixedPersona};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// 按脚本应答的对话服务
    enum Script {
        Respond(ChatResponse),
        Reject,
        Undecodable,
    }

    struct MockChatService {
        script: Script,
        requests: Mutex<Vec<ChatRequest>>,
        /// 设置后在应答前等待放行
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl MockChatService {
        fn new(script: Script) -> Self {
            Self {
                script,
                requests: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn gated(script: Script, arrived: Arc<Notify>, release: Arc<Notify>) -> Self {
            Self {
                gate: Some((arrived, release)),
                ..Self::new(script)
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatServicePort for MockChatService {
        async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ChatServiceError> {
            self.requests.lock().unwrap().push(request);
            if let Some((arrived, release)) = &self.gate {
                arrived.notify_one();
                release.notified().await;
            }
            match &self.script {
                Script::Respond(response) => Ok(response.clone()),
                Script::Reject => Err(ChatServiceError::Transport("connection refused".into())),
                Script::Undecodable => Err(ChatServiceError::Decode("expected value".into())),
            }
        }
    }

    fn controller(
        service: Arc<MockChatService>,
    ) -> (ConversationController, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::new());
        let controller = ConversationController::new(
            service,
            renderer.clone(),
            Arc::new(FixedPersona("warm_partner".to_string())),
            EventBus::new(),
            Duration::ZERO,
        );
        (controller, renderer)
    }

    fn happy_reply() -> ChatResponse {
        ChatResponse::success("你好呀", Some(EmotionSnapshot::new("开心", 2, 0.9)))
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let service = Arc::new(MockChatService::new(Script::Respond(happy_reply())));
        let (controller, renderer) = controller(service.clone());

        let outcome = controller.send_message("你好").await;
        assert_eq!(
            outcome,
            SendOutcome::Replied {
                reply: "你好呀".to_string(),
                emotion: Some(EmotionSnapshot::new("开心", 2, 0.9)),
            }
        );

        let messages = renderer.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender(), Sender::User);
        assert_eq!(messages[0].content(), "你好");
        assert!(messages[0].sent_at().is_some());
        assert_eq!(messages[1].sender(), Sender::Assistant);
        assert_eq!(messages[1].content(), "你好呀");
        assert_eq!(messages[1].state(), RenderState::Final);

        let frames: Vec<String> = renderer
            .updates_for(messages[1].id())
            .into_iter()
            .map(|(content, _)| content)
            .collect();
        assert_eq!(frames, vec!["", "你", "你好", "你好呀", "你好呀"]);

        let indicator = renderer.emotion_indicator().unwrap();
        assert_eq!(indicator.icon, "😊");
        assert_eq!(indicator.badge, "开心");
        assert_eq!(indicator.confidence_text, "置信度 90%");

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "你好");
        assert_eq!(requests[0].persona_id, "warm_partner");
        assert_eq!(requests[0].session_id, controller.session_id().as_str());

        assert_eq!(controller.message_count(), 1);
        assert_eq!(renderer.message_count(), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_placeholder_rendered_before_request() {
        let arrived = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let service = Arc::new(MockChatService::gated(
            Script::Respond(happy_reply()),
            arrived.clone(),
            release.clone(),
        ));
        let (controller, renderer) = controller(service);
        let controller = Arc::new(controller);

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send_message("  你好  ").await })
        };
        arrived.notified().await;

        let messages = renderer.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content(), "你好");
        assert_eq!(messages[1].content(), PLACEHOLDER_TEXT);
        assert_eq!(messages[1].state(), RenderState::Pending);
        assert!(controller.is_busy());

        release.notify_one();
        task.await.unwrap();
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        let service = Arc::new(MockChatService::new(Script::Respond(happy_reply())));
        let (controller, renderer) = controller(service.clone());

        for input in ["", "   ", "\n\t "] {
            assert_eq!(
                controller.send_message(input).await,
                SendOutcome::Ignored(IgnoreReason::EmptyInput)
            );
        }

        assert!(renderer.records().is_empty());
        assert!(service.requests().is_empty());
        assert_eq!(controller.message_count(), 0);
    }

    #[tokio::test]
    async fn test_send_while_in_flight_is_ignored() {
        let arrived = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let service = Arc::new(MockChatService::gated(
            Script::Respond(happy_reply()),
            arrived.clone(),
            release.clone(),
        ));
        let (controller, renderer) = controller(service.clone());
        let controller = Arc::new(controller);

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send_message("第一条").await })
        };
        arrived.notified().await;

        let rendered_before = renderer.rendered_count();
        assert_eq!(
            controller.send_message("第二条").await,
            SendOutcome::Ignored(IgnoreReason::Busy)
        );
        assert_eq!(renderer.rendered_count(), rendered_before);

        release.notify_one();
        assert!(matches!(first.await.unwrap(), SendOutcome::Replied { .. }));
        assert_eq!(service.requests().len(), 1);
        assert_eq!(controller.message_count(), 1);

        // 释放后可以再次发送
        let arrived_again = arrived.clone();
        let release_again = release.clone();
        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send_message("第三条").await })
        };
        arrived_again.notified().await;
        release_again.notify_one();
        assert!(matches!(second.await.unwrap(), SendOutcome::Replied { .. }));
        assert_eq!(controller.message_count(), 2);
    }

    #[tokio::test]
    async fn test_server_failure_text() {
        let service = Arc::new(MockChatService::new(Script::Respond(ChatResponse::failure(
            "服务器内部错误",
        ))));
        let (controller, renderer) = controller(service);

        assert_eq!(
            controller.send_message("hi").await,
            SendOutcome::Failed(FailureKind::Server)
        );

        let messages = renderer.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content(), SERVER_FAILURE_TEXT);
        assert_eq!(messages[1].state(), RenderState::Final);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_success_without_reply_is_server_failure() {
        let response = ChatResponse {
            status: Some("success".to_string()),
            ..Default::default()
        };
        let service = Arc::new(MockChatService::new(Script::Respond(response)));
        let (controller, renderer) = controller(service);

        assert_eq!(
            controller.send_message("hi").await,
            SendOutcome::Failed(FailureKind::Server)
        );
        assert!(renderer.emotion_indicator().is_none());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_emotion() {
        let service = Arc::new(MockChatService::new(Script::Reject));
        let (controller, renderer) = controller(service);

        let previous = EmotionSnapshot::new("焦虑", 0, 0.6);
        controller.update_emotion_display(Some(&previous));

        assert_eq!(
            controller.send_message("test").await,
            SendOutcome::Failed(FailureKind::Transport)
        );

        let messages = renderer.messages();
        assert_eq!(messages[1].content(), "网络错误，请检查连接");
        assert_eq!(
            renderer.emotion_indicator(),
            Some(EmotionIndicator::from(&previous))
        );
        assert_eq!(controller.last_emotion(), Some(previous));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_network_failure() {
        let service = Arc::new(MockChatService::new(Script::Undecodable));
        let (controller, renderer) = controller(service);

        assert_eq!(
            controller.send_message("test").await,
            SendOutcome::Failed(FailureKind::Transport)
        );
        assert_eq!(renderer.messages()[1].content(), NETWORK_FAILURE_TEXT);
    }

    #[tokio::test]
    async fn test_success_without_emotion_hides_indicator() {
        let service = Arc::new(MockChatService::new(Script::Respond(ChatResponse::success(
            "嗯嗯", None,
        ))));
        let (controller, renderer) = controller(service);
        controller.update_emotion_display(Some(&EmotionSnapshot::new("开心", 2, 0.8)));

        controller.send_message("在吗").await;
        assert!(renderer.emotion_indicator().is_none());
        assert!(controller.last_emotion().is_none());
    }

    #[tokio::test]
    async fn test_care_message_renders_while_in_flight() {
        let arrived = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let service = Arc::new(MockChatService::gated(
            Script::Respond(happy_reply()),
            arrived.clone(),
            release.clone(),
        ));
        let (controller, renderer) = controller(service);
        let controller = Arc::new(controller);

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send_message("你好").await })
        };
        arrived.notified().await;

        let care_id = controller.receive_care_message("记得喝水哦");
        let care = renderer.message(care_id).unwrap();
        assert_eq!(care.sender(), Sender::SystemPush);
        assert_eq!(care.state(), RenderState::Final);
        assert_eq!(care.content(), "记得喝水哦");
        assert!(controller.is_busy());

        release.notify_one();
        task.await.unwrap();
        assert_eq!(renderer.messages().len(), 3);
        assert_eq!(controller.message_count(), 1);
    }

    #[test]
    fn test_update_emotion_display() {
        let service = Arc::new(MockChatService::new(Script::Reject));
        let (controller, renderer) = controller(service);

        controller.update_emotion_display(Some(&EmotionSnapshot::new("开心", 2, 0.87)));
        let indicator = renderer.emotion_indicator().unwrap();
        assert_eq!(indicator.icon, "😊");
        assert_eq!(indicator.badge, "开心");
        assert_eq!(indicator.confidence_text, "置信度 87%");

        controller.update_emotion_display(Some(&EmotionSnapshot::new("未知情绪", 1, 0.5)));
        let indicator = renderer.emotion_indicator().unwrap();
        assert_eq!(indicator.icon, DEFAULT_EMOTION_ICON);
        assert_eq!(indicator.label, "未知情绪");
        assert_eq!(indicator.badge, "平常");

        controller.update_emotion_display(None);
        assert!(renderer.emotion_indicator().is_none());
        controller.update_emotion_display(None);
        assert!(renderer.emotion_indicator().is_none());
    }

    #[tokio::test]
    async fn test_events_published() {
        let service = Arc::new(MockChatService::new(Script::Reject));
        let renderer = Arc::new(RecordingRenderer::new());
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let controller = ConversationController::new(
            service,
            renderer,
            Arc::new(FixedPersona("warm_partner".to_string())),
            events,
            Duration::ZERO,
        );

        controller.send_message("test").await;

        assert!(matches!(rx.recv().await.unwrap(), ClientEvent::MessageSent { .. }));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ClientEvent::ReplyFailed {
                kind: FailureKind::Transport,
                ..
            }
        ));
    }
}
