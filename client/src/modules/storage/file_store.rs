// File-based Key-Value Store
//
// 以单个 JSON 对象文件持久化键值，带内存缓存，写入即落盘

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::ports::{KeyValueStore, StoreError};

const STORE_FILE_NAME: &str = "preferences.json";

/// 文件键值存储
pub struct FileKeyValueStore {
    /// 存储文件路径
    path: PathBuf,
    /// 内存缓存（首次访问时加载）
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl FileKeyValueStore {
    /// 在数据目录下创建存储
    ///
    /// # Arguments
    /// * `data_dir` - 应用数据目录
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at_path(data_dir.as_ref().join(STORE_FILE_NAME))
    }

    /// 使用指定文件路径
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从文件加载
    async fn load_from_file(&self) -> Result<HashMap<String, String>, StoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(HashMap::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// 保存到文件
    async fn save_to_file(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(values)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// 在写锁内读改写
    async fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let mut cache = self.cache.write().await;
        let mut values = match cache.take() {
            Some(values) => values,
            None => match self.load_from_file().await {
                Ok(values) => values,
                // 损坏的文件在下次写入时被覆盖
                Err(StoreError::Serialization(e)) => {
                    tracing::warn!(
                        "[FileKeyValueStore] Discarding unreadable {:?}: {}",
                        self.path,
                        e
                    );
                    HashMap::new()
                }
                Err(e) => return Err(e),
            },
        };

        mutate(&mut values);
        let result = self.save_to_file(&values).await;
        *cache = Some(values);
        result
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref values) = *cache {
                return Ok(values.get(key).cloned());
            }
        }

        let values = self.load_from_file().await?;
        let value = values.get(key).cloned();

        let mut cache = self.cache.write().await;
        if cache.is_none() {
            *cache = Some(values);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tracing::debug!("[FileKeyValueStore] set {} in {:?}", key, self.path);
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|values| {
            values.remove(key);
        })
        .await
    }
}
