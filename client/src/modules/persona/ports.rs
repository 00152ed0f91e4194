use async_trait::async_trait;
use thiserror::Error;

use super::PersonaListResponse;
use crate::modules::storage::StoreError;

/// 人格模块错误类型
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Unknown persona: {0}")]
    Unknown(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// 人格目录端口
#[async_trait]
pub trait PersonaDirectoryPort: Send + Sync {
    /// 获取服务端提供的人格列表
    async fn fetch(&self) -> Result<PersonaListResponse, PersonaError>;
}
