use serde::{Deserialize, Serialize};

use crate::modules::chat::ports::STATUS_SUCCESS;

/// 默认人格 ID
pub const DEFAULT_PERSONA_ID: &str = "warm_partner";

/// 可选的助手人格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>, emoji: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            emoji: emoji.map(str::to_string),
        }
    }

    /// 列表中显示的文本：`{emoji} {name}`
    pub fn display_label(&self) -> String {
        format!("{} {}", self.emoji.as_deref().unwrap_or(""), self.name)
    }

    /// 目录不可达时使用的内置人格
    pub fn fallback() -> Self {
        Self::new(DEFAULT_PERSONA_ID, "暖心伴侣（女友）", Some("💕"))
    }
}

/// 人格列表响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaListResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PersonaListResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}
