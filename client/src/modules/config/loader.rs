// Config Loader
//
// 分层加载：默认值 → JSON 文件 → 环境变量

use std::path::{Path, PathBuf};

use super::entities::{ClientConfig, ConfigError};

const CONFIG_FILE_NAME: &str = "config.json";

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "WARMCHAT_CONFIG";
pub const BASE_URL_ENV: &str = "WARMCHAT_BASE_URL";
pub const WS_URL_ENV: &str = "WARMCHAT_WS_URL";
pub const REVEAL_SPEED_ENV: &str = "WARMCHAT_REVEAL_SPEED_MS";

/// 配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// 指定配置文件路径
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 从 WARMCHAT_CONFIG 或默认数据目录确定配置文件
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::new(ClientConfig::default().data_dir.join(CONFIG_FILE_NAME)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 加载配置并应用进程环境变量
    pub async fn load(&self) -> Result<ClientConfig, ConfigError> {
        self.load_with(|key| std::env::var(key).ok()).await
    }

    /// 加载配置，环境变量通过 lookup 获取
    pub async fn load_with<F>(&self, lookup: F) -> Result<ClientConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.load_from_file().await? {
            Some(config) => {
                tracing::info!("[ConfigLoader] Loaded configuration from {:?}", self.path);
                config
            }
            None => {
                tracing::debug!(
                    "[ConfigLoader] No configuration at {:?}, using defaults",
                    self.path
                );
                ClientConfig::default()
            }
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    async fn load_from_file(&self) -> Result<Option<ClientConfig>, ConfigError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// 应用环境变量覆盖
pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(BASE_URL_ENV) {
        config.base_url = base_url;
    }

    if let Some(ws_url) = lookup(WS_URL_ENV) {
        config.ws_url = Some(ws_url);
    }

    if let Some(speed) = lookup(REVEAL_SPEED_ENV) {
        config.reveal_speed_ms = speed.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("{} must be an integer: {}", REVEAL_SPEED_ENV, speed))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let loader = ConfigLoader::new(std::env::temp_dir().join(format!("{}.json", Uuid::new_v4())));
        let config = loader.load_with(env(&[])).await.unwrap();
        assert_eq!(config.api_path, "/api/chat");
    }

    #[tokio::test]
    async fn test_file_then_env_override() {
        let path = std::env::temp_dir().join(format!("warmchat-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"baseUrl": "http://file-host:5000", "revealSpeedMs": 10}"#)
            .await
            .unwrap();

        let loader = ConfigLoader::new(&path);
        let config = loader
            .load_with(env(&[(REVEAL_SPEED_ENV, "0"), (WS_URL_ENV, "ws://push-host:5001")]))
            .await
            .unwrap();

        assert_eq!(config.base_url, "http://file-host:5000");
        assert_eq!(config.reveal_speed_ms, 0);
        assert_eq!(config.ws_endpoint(), "ws://push-host:5001");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let loader = ConfigLoader::new(std::env::temp_dir().join(format!("{}.json", Uuid::new_v4())));
        let result = loader.load_with(env(&[(REVEAL_SPEED_ENV, "fast")])).await;
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = loader.load_with(env(&[(BASE_URL_ENV, "")])).await;
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("warmchat-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = ConfigLoader::new(&path).load_with(env(&[])).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
