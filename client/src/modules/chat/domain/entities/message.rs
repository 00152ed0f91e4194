use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::super::value_objects::MessageId;

/// 占位消息内容
pub const PLACEHOLDER_TEXT: &str = "...";

/// 消息发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// 用户输入
    User,
    /// 请求触发的助手回复
    Assistant,
    /// 推送通道下发的消息
    SystemPush,
}

/// 渲染状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    /// 等待回复的占位
    Pending,
    /// 正在逐字显示
    Typing,
    /// 最终内容
    Final,
}

/// 消息实体
///
/// 只在渲染时存在，不做持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    sender: Sender,
    content: String,
    state: RenderState,
    /// 渲染时间
    timestamp: DateTime<Local>,
    /// 用户消息的已发送时间（HH:MM）
    sent_at: Option<String>,
}

impl Message {
    fn new(sender: Sender, content: impl Into<String>, state: RenderState) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            content: content.into(),
            state,
            timestamp: Local::now(),
            sent_at: None,
        }
    }

    /// 创建用户消息
    pub fn new_user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content, RenderState::Final)
    }

    /// 创建助手占位消息
    pub fn new_placeholder() -> Self {
        Self::new(Sender::Assistant, PLACEHOLDER_TEXT, RenderState::Pending)
    }

    /// 创建推送消息
    pub fn new_push(content: impl Into<String>) -> Self {
        Self::new(Sender::SystemPush, content, RenderState::Final)
    }

    // Getters
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn sent_at(&self) -> Option<&str> {
        self.sent_at.as_deref()
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    // Setters（渲染层使用）
    pub fn update(&mut self, content: impl Into<String>, state: RenderState) {
        self.content = content.into();
        self.state = state;
    }

    pub fn mark_sent(&mut self, time: impl Into<String>) {
        self.sent_at = Some(time.into());
    }
}
