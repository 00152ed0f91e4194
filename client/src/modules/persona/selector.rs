use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{Persona, PersonaDirectoryPort, PersonaError};
use crate::infrastructure::{ClientEvent, EventBus};
use crate::modules::chat::ports::PersonaProvider;
use crate::modules::storage::KeyValueStore;

/// 人格选择存储键
pub const PERSONA_KEY: &str = "selectedPersona";

/// 人格选择器
///
/// 当前选择在构造时从存储读取，未保存时使用配置的默认值
pub struct PersonaSelector {
    directory: Arc<dyn PersonaDirectoryPort>,
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    personas: RwLock<Vec<Persona>>,
    current: RwLock<String>,
}

impl PersonaSelector {
    pub async fn new(
        directory: Arc<dyn PersonaDirectoryPort>,
        store: Arc<dyn KeyValueStore>,
        events: EventBus,
        default_id: impl Into<String>,
    ) -> Self {
        let saved = match store.get(PERSONA_KEY).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("[PersonaSelector] Failed to read saved persona: {}", e);
                None
            }
        };
        let current = saved.unwrap_or_else(|| default_id.into());

        Self {
            directory,
            store,
            events,
            personas: RwLock::new(Vec::new()),
            current: RwLock::new(current),
        }
    }

    /// 加载人格列表
    ///
    /// 目录不可达或响应无法解析时使用内置人格；服务端返回失败状态时列表保持不变
    pub async fn load_personas(&self) -> Vec<Persona> {
        let loaded = match self.directory.fetch().await {
            Ok(response) if response.is_success() => {
                info!("[PersonaSelector] Loaded {} personas", response.personas.len());
                response.personas
            }
            Ok(response) => {
                warn!(
                    "[PersonaSelector] Directory answered status={:?} error={:?}",
                    response.status, response.error
                );
                return self.personas().await;
            }
            Err(e) => {
                warn!("[PersonaSelector] Falling back to built-in persona: {}", e);
                vec![Persona::fallback()]
            }
        };

        *self.personas.write().await = loaded.clone();
        loaded
    }

    /// 已加载的人格列表
    pub async fn personas(&self) -> Vec<Persona> {
        self.personas.read().await.clone()
    }

    /// 当前人格
    pub async fn current(&self) -> Option<Persona> {
        let current = self.current.read().await.clone();
        self.personas
            .read()
            .await
            .iter()
            .find(|p| p.id == current)
            .cloned()
    }

    /// 选择人格并持久化
    ///
    /// 列表已加载时只接受其中的 ID
    pub async fn select(&self, id: &str) -> Result<(), PersonaError> {
        {
            let personas = self.personas.read().await;
            if !personas.is_empty() && !personas.iter().any(|p| p.id == id) {
                return Err(PersonaError::Unknown(id.to_string()));
            }
        }

        *self.current.write().await = id.to_string();
        self.store.set(PERSONA_KEY, id).await?;
        info!("[PersonaSelector] Selected persona: {}", id);
        self.events.publish(ClientEvent::PersonaChanged {
            persona_id: id.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl PersonaProvider for PersonaSelector {
    async fn current_persona_id(&self) -> String {
        self.current.read().await.clone()
    }
}
