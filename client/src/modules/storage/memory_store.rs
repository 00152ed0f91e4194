// In-Memory Key-Value Store
//
// 基于内存的键值存储实现（用于测试和开发）

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ports::{KeyValueStore, StoreError};

/// 内存键值存储
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用初始键值创建
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        values.remove(key);
        Ok(())
    }
}

/// 读取总是失败、写入正常的存储，模拟损坏的偏好文件
#[cfg(test)]
#[derive(Default)]
pub struct UnreadableStore {
    written: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl UnreadableStore {
    pub fn written(&self) -> Vec<(String, String)> {
        self.written.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for UnreadableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        let err = serde_json::from_str::<HashMap<String, String>>("{not json").unwrap_err();
        Err(StoreError::Serialization(err))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.written
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
