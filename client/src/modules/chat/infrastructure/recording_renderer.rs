// Recording Renderer
//
// 内存渲染器：记录所有渲染操作，供测试与嵌入方读取

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::modules::chat::domain::{EmotionIndicator, Message, MessageId, RenderState};
use crate::modules::chat::ports::RenderPort;
use crate::modules::theme::{ThemeAppearance, ThemeSurface};

/// 单次渲染操作
#[derive(Debug, Clone, PartialEq)]
pub enum RenderRecord {
    Rendered(MessageId),
    Updated {
        id: MessageId,
        content: String,
        state: RenderState,
    },
    Sent {
        id: MessageId,
        time: String,
    },
    Emotion(Option<EmotionIndicator>),
    MessageCount(u64),
    Connection(bool),
    Theme(ThemeAppearance),
    Toast {
        message: String,
        duration: Duration,
    },
}

#[derive(Default)]
struct RecorderState {
    messages: Vec<Message>,
    records: Vec<RenderRecord>,
    indicator: Option<EmotionIndicator>,
    message_count: u64,
    connected: Option<bool>,
}

/// 记录型渲染器
#[derive(Default)]
pub struct RecordingRenderer {
    state: Mutex<RecorderState>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 按显示顺序返回所有消息的当前状态
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.lock().messages.iter().find(|m| m.id() == id).cloned()
    }

    /// render_message 调用次数
    pub fn rendered_count(&self) -> usize {
        self.lock()
            .records
            .iter()
            .filter(|r| matches!(r, RenderRecord::Rendered(_)))
            .count()
    }

    pub fn records(&self) -> Vec<RenderRecord> {
        self.lock().records.clone()
    }

    /// 某条消息收到的全部更新
    pub fn updates_for(&self, id: MessageId) -> Vec<(String, RenderState)> {
        self.lock()
            .records
            .iter()
            .filter_map(|r| match r {
                RenderRecord::Updated {
                    id: updated,
                    content,
                    state,
                } if *updated == id => Some((content.clone(), *state)),
                _ => None,
            })
            .collect()
    }

    /// 当前情绪指示器，None 表示隐藏
    pub fn emotion_indicator(&self) -> Option<EmotionIndicator> {
        self.lock().indicator.clone()
    }

    pub fn message_count(&self) -> u64 {
        self.lock().message_count
    }

    pub fn connected(&self) -> Option<bool> {
        self.lock().connected
    }

    pub fn themes(&self) -> Vec<ThemeAppearance> {
        self.lock()
            .records
            .iter()
            .filter_map(|r| match r {
                RenderRecord::Theme(appearance) => Some(*appearance),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<(String, Duration)> {
        self.lock()
            .records
            .iter()
            .filter_map(|r| match r {
                RenderRecord::Toast { message, duration } => Some((message.clone(), *duration)),
                _ => None,
            })
            .collect()
    }
}

impl RenderPort for RecordingRenderer {
    fn render_message(&self, message: &Message) {
        let mut state = self.lock();
        state.messages.push(message.clone());
        state.records.push(RenderRecord::Rendered(message.id()));
    }

    fn update_message(&self, id: MessageId, content: &str, render_state: RenderState) {
        let mut state = self.lock();
        if let Some(message) = state.messages.iter_mut().find(|m| m.id() == id) {
            message.update(content, render_state);
        }
        state.records.push(RenderRecord::Updated {
            id,
            content: content.to_string(),
            state: render_state,
        });
    }

    fn mark_sent(&self, id: MessageId, time: &str) {
        let mut state = self.lock();
        if let Some(message) = state.messages.iter_mut().find(|m| m.id() == id) {
            message.mark_sent(time);
        }
        state.records.push(RenderRecord::Sent {
            id,
            time: time.to_string(),
        });
    }

    fn set_emotion_indicator(&self, indicator: Option<&EmotionIndicator>) {
        let mut state = self.lock();
        state.indicator = indicator.cloned();
        state.records.push(RenderRecord::Emotion(indicator.cloned()));
    }

    fn set_message_count(&self, count: u64) {
        let mut state = self.lock();
        state.message_count = count;
        state.records.push(RenderRecord::MessageCount(count));
    }

    fn set_connection_status(&self, connected: bool) {
        let mut state = self.lock();
        state.connected = Some(connected);
        state.records.push(RenderRecord::Connection(connected));
    }
}

impl ThemeSurface for RecordingRenderer {
    fn apply_theme(&self, appearance: &ThemeAppearance) {
        self.lock().records.push(RenderRecord::Theme(*appearance));
    }

    fn show_toast(&self, message: &str, duration: Duration) {
        self.lock().records.push(RenderRecord::Toast {
            message: message.to_string(),
            duration,
        });
    }
}
