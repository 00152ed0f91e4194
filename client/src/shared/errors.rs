use thiserror::Error;

use crate::modules::chat::ports::ChatServiceError;
use crate::modules::config::ConfigError;
use crate::modules::notification::ChannelError;
use crate::modules::persona::PersonaError;
use crate::modules::storage::StoreError;

/// 启动与装配阶段的错误汇总
///
/// 对话流程内部的失败不会转换成 AppError，它们在渲染层终结
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error("Chat service error: {0}")]
    ChatServiceError(#[from] ChatServiceError),

    #[error("Notification channel error: {0}")]
    ChannelError(#[from] ChannelError),

    #[error("Persona error: {0}")]
    PersonaError(#[from] PersonaError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_serializes_as_message() {
        let err = AppError::from(ConfigError::Invalid("baseUrl is empty".to_string()));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Configuration error: Invalid configuration: baseUrl is empty\"");
    }
}
