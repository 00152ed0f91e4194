// HTTP Chat Service Adapter
//
// POST {message, session_id, persona_id} 到对话接口

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::modules::chat::ports::{ChatRequest, ChatResponse, ChatServiceError, ChatServicePort};

/// HTTP 对话服务
pub struct HttpChatService {
    client: Client,
    url: String,
}

impl HttpChatService {
    /// 创建新的适配器实例
    ///
    /// # Arguments
    /// * `url` - 对话接口完整地址
    /// * `timeout` - 单次请求超时
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChatServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatServicePort for HttpChatService {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ChatServiceError> {
        debug!(
            "[HttpChatService] POST {} session={} persona={}",
            self.url, request.session_id, request.persona_id
        );

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("[HttpChatService] Server answered {}", status);
        }

        // 错误状态码也带 JSON 体，按响应体判断成败
        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ChatServiceError::Decode(e.to_string()))
    }
}
