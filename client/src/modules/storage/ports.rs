// Key-Value Store Port
//
// 字符串键值持久化端口

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 键值存储端口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键值
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入键值
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// 删除键值
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
