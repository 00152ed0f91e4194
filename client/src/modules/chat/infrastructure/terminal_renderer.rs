// Terminal Renderer
//
// 把对话输出到终端：逐字显示时只追加新字符，结束时换行。
// 逐字显示中途插入其它输出时，续写前另起一行并重打前缀

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::modules::chat::domain::{
    EmotionIndicator, Message, MessageId, RenderState, Sender,
};
use crate::modules::chat::ports::RenderPort;
use crate::modules::theme::{Theme, ThemeAppearance, ThemeSurface};

fn prefix(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "你 ▸ ",
        Sender::Assistant => "AI ▸ ",
        Sender::SystemPush => "💌 ▸ ",
    }
}

/// 逐字显示进度
struct Progress {
    sender: Sender,
    /// 已输出的字符数，None 表示尚未开始
    printed: Option<usize>,
}

struct Screen {
    out: Box<dyn Write + Send>,
    progress: HashMap<MessageId, Progress>,
    /// 光标所在的未换行逐字显示行
    open_line: Option<MessageId>,
}

impl Screen {
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    /// 输出完整的一行，必要时先结束未换行的逐字显示行
    fn line(&mut self, text: &str) {
        if self.open_line.take().is_some() {
            self.emit("\n");
        }
        self.emit(text);
    }
}

/// 终端渲染器
pub struct TerminalRenderer {
    screen: Mutex<Screen>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// 输出到指定的写入端
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out: Box::new(out),
                progress: HashMap::new(),
                open_line: None,
            }),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self, text: &str) {
        self.screen().line(text);
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPort for TerminalRenderer {
    fn render_message(&self, message: &Message) {
        let mut screen = self.screen();
        screen.line(&format!(
            "{}{}\n",
            prefix(message.sender()),
            message.content()
        ));

        if message.state() != RenderState::Final {
            screen.progress.insert(
                message.id(),
                Progress {
                    sender: message.sender(),
                    printed: None,
                },
            );
        }
    }

    fn update_message(&self, id: MessageId, content: &str, state: RenderState) {
        let mut screen = self.screen();
        let tracked = screen
            .progress
            .get(&id)
            .map(|entry| (entry.sender, entry.printed.unwrap_or(0)));
        let Some((sender, printed)) = tracked else {
            screen.line(&format!("{}\n", content));
            return;
        };

        let mut output = String::new();
        let from = if screen.open_line == Some(id) {
            printed
        } else {
            if screen.open_line.is_some() {
                output.push('\n');
            }
            output.push_str(prefix(sender));
            0
        };

        let total = content.chars().count();
        output.extend(content.chars().skip(from));

        if state == RenderState::Final {
            output.push('\n');
            screen.progress.remove(&id);
            screen.open_line = None;
        } else {
            if let Some(entry) = screen.progress.get_mut(&id) {
                entry.printed = Some(total.max(printed));
            }
            screen.open_line = Some(id);
        }

        screen.emit(&output);
    }

    fn mark_sent(&self, _id: MessageId, time: &str) {
        self.write(&format!("    ✓ 已发送 {}\n", time));
    }

    fn set_emotion_indicator(&self, indicator: Option<&EmotionIndicator>) {
        if let Some(indicator) = indicator {
            self.write(&format!(
                "    {} {} · {} · {}\n",
                indicator.icon, indicator.label, indicator.badge, indicator.confidence_text
            ));
        }
    }

    fn set_message_count(&self, count: u64) {
        tracing::trace!("[TerminalRenderer] message count {}", count);
    }

    fn set_connection_status(&self, connected: bool) {
        if connected {
            self.write("● 在线\n");
        } else {
            self.write("○ 离线\n");
        }
    }
}

impl ThemeSurface for TerminalRenderer {
    fn apply_theme(&self, appearance: &ThemeAppearance) {
        self.write(&format!(
            "[主题] {} 当前为{}主题，可切换到{}\n",
            appearance.icon,
            match appearance.theme {
                Theme::Dark => "夜间",
                Theme::Light => "日间",
            },
            appearance.label
        ));
    }

    fn show_toast(&self, message: &str, _duration: Duration) {
        self.write(&format!("» {}\n", message));
    }
}
