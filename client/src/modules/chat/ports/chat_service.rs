use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::chat::domain::{EmotionSnapshot, SessionId};

/// 服务端成功状态值
pub const STATUS_SUCCESS: &str = "success";

/// 对话服务错误类型
///
/// 两类都属于传输层失败
#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// 对话请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub persona_id: String,
}

impl ChatRequest {
    pub fn new(
        message: impl Into<String>,
        session_id: &SessionId,
        persona_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.to_string(),
            persona_id: persona_id.into(),
        }
    }
}

/// 对话响应
///
/// 服务端出错时只返回 `error` 字段，所有字段都按可缺省处理
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub emotion: Option<EmotionSnapshot>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub history_length: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    /// 构造成功响应
    pub fn success(reply: impl Into<String>, emotion: Option<EmotionSnapshot>) -> Self {
        Self {
            status: Some(STATUS_SUCCESS.to_string()),
            reply: Some(reply.into()),
            emotion,
            ..Default::default()
        }
    }

    /// 构造服务端失败响应
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

/// 对话服务端口
#[async_trait]
pub trait ChatServicePort: Send + Sync {
    /// 发送一次请求并等待响应
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ChatServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest::new("你好", &SessionId::from_string("user_1_a"), "warm_partner");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "你好",
                "session_id": "user_1_a",
                "persona_id": "warm_partner"
            })
        );
    }

    #[test]
    fn test_success_response_parses() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "reply": "你好呀",
                "status": "success",
                "session_id": "user_1_a",
                "history_length": 2,
                "emotion": {"emotion": "开心", "polarity": 2, "confidence": 0.9},
                "emotion_type": "dict"
            }"#,
        )
        .unwrap();

        assert!(response.is_success());
        assert_eq!(response.reply.as_deref(), Some("你好呀"));
        assert_eq!(response.emotion.unwrap().emotion, "开心");
    }

    #[test]
    fn test_error_body_is_not_success() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"error": "请提供message参数"}"#).unwrap();
        assert!(!response.is_success());
        assert!(response.emotion.is_none());
    }

    #[test]
    fn test_null_emotion_is_none() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"status": "success", "reply": "嗯", "emotion": null}"#)
                .unwrap();
        assert!(response.emotion.is_none());
    }
}
