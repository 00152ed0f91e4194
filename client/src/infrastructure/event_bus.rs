use tokio::sync::broadcast;

use crate::modules::chat::application::FailureKind;
use crate::modules::chat::domain::{EmotionSnapshot, MessageId, SessionId};
use crate::modules::notification::ConnectionState;
use crate::modules::theme::Theme;

const EVENT_CAPACITY: usize = 100;

/// 客户端事件
#[derive(Clone, Debug)]
pub enum ClientEvent {
    MessageSent {
        session_id: SessionId,
        message_id: MessageId,
        content: String,
    },
    ReplyRevealed {
        message_id: MessageId,
        reply: String,
        emotion: Option<EmotionSnapshot>,
    },
    ReplyFailed {
        message_id: MessageId,
        kind: FailureKind,
    },
    CareMessageReceived {
        message_id: MessageId,
        content: String,
    },
    ConnectionChanged {
        state: ConnectionState,
    },
    ThemeChanged {
        theme: Theme,
    },
    PersonaChanged {
        persona_id: String,
    },
}

/// 进程内事件总线
///
/// 发布不阻塞，没有订阅者时事件被丢弃
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: ClientEvent) {
        tracing::debug!("[EventBus] Publishing event: {:?}", event);
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(ClientEvent::PersonaChanged {
            persona_id: "warm_partner".to_string(),
        });

        match rx.recv().await.unwrap() {
            ClientEvent::PersonaChanged { persona_id } => assert_eq!(persona_id, "warm_partner"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(ClientEvent::ThemeChanged { theme: Theme::Dark });
    }
}
