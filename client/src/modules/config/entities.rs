// Config Entities
//
// 客户端配置实体定义

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// 后端服务根地址
    pub base_url: String,
    /// 对话接口路径
    pub api_path: String,
    /// 人格列表接口路径
    pub personas_path: String,
    /// 推送通道地址，为空时沿用 base_url
    pub ws_url: Option<String>,
    /// 关怀消息事件名
    pub care_event: String,
    /// 逐字显示间隔（毫秒）
    pub reveal_speed_ms: u64,
    /// 连接后是否发送 register 事件
    pub register_on_connect: bool,
    /// 推送通道重连初始间隔（毫秒）
    pub reconnect_delay_ms: u64,
    /// 推送通道重连最大间隔（毫秒）
    pub reconnect_delay_max_ms: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 默认人格
    pub default_persona_id: String,
    /// 本地数据目录
    pub data_dir: PathBuf,
    /// 未使用，保留与服务端配置一致
    pub max_retries: u32,
    /// 未使用，保留与服务端配置一致
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            api_path: "/api/chat".to_string(),
            personas_path: "/api/personas".to_string(),
            ws_url: None,
            care_event: "care_message".to_string(),
            reveal_speed_ms: 50,
            register_on_connect: true,
            reconnect_delay_ms: 1000,
            reconnect_delay_max_ms: 30_000,
            request_timeout_secs: 60,
            default_persona_id: "warm_partner".to_string(),
            data_dir: PathBuf::from(".warmchat"),
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// 对话接口完整地址
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.api_path)
    }

    /// 人格列表接口完整地址
    pub fn personas_url(&self) -> String {
        join_url(&self.base_url, &self.personas_path)
    }

    /// 推送通道地址
    pub fn ws_endpoint(&self) -> &str {
        self.ws_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn reveal_speed(&self) -> Duration {
        Duration::from_millis(self.reveal_speed_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn reconnect_delay_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_max_ms.max(self.reconnect_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_scheme("baseUrl", &self.base_url, &["http://", "https://"])?;

        if let Some(ws_url) = &self.ws_url {
            check_scheme(
                "wsUrl",
                ws_url,
                &["http://", "https://", "ws://", "wss://"],
            )?;
        }

        if self.care_event.trim().is_empty() {
            return Err(ConfigError::Invalid("careEvent is empty".to_string()));
        }

        if self.default_persona_id.trim().is_empty() {
            return Err(ConfigError::Invalid("defaultPersonaId is empty".to_string()));
        }

        Ok(())
    }
}

fn check_scheme(field: &str, url: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} is empty", field)));
    }

    if !allowed.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ConfigError::Invalid(format!(
            "{} must start with one of {}: {}",
            field,
            allowed.join(", "),
            url
        )));
    }

    Ok(())
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
