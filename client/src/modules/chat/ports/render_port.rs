use async_trait::async_trait;
use std::time::Duration;

use crate::modules::chat::domain::{EmotionIndicator, Message, MessageId, RenderState};

/// 渲染端口
///
/// 对话控制器只通过此接口操作显示层，便于在无界面环境下测试
#[async_trait]
pub trait RenderPort: Send + Sync {
    /// 显示一条新消息
    fn render_message(&self, message: &Message);

    /// 替换已显示消息的内容与状态
    fn update_message(&self, id: MessageId, content: &str, state: RenderState);

    /// 标记用户消息已发送
    fn mark_sent(&self, id: MessageId, time: &str);

    /// 显示或隐藏情绪指示器
    fn set_emotion_indicator(&self, indicator: Option<&EmotionIndicator>);

    /// 更新消息计数
    fn set_message_count(&self, count: u64);

    /// 更新推送通道在线状态
    fn set_connection_status(&self, connected: bool);

    /// 逐字显示文本
    ///
    /// 每个字符之后等待 `speed`，顺序执行且不可取消；结束时消息为 Final 状态
    async fn reveal_text(&self, id: MessageId, text: &str, speed: Duration) {
        let mut shown = String::with_capacity(text.len());
        self.update_message(id, &shown, RenderState::Typing);

        for ch in text.chars() {
            shown.push(ch);
            self.update_message(id, &shown, RenderState::Typing);
            tokio::time::sleep(speed).await;
        }

        self.update_message(id, &shown, RenderState::Final);
    }
}
