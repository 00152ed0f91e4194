use async_trait::async_trait;

/// 当前人格提供者
///
/// 对话请求需要携带用户选择的人格 ID
#[async_trait]
pub trait PersonaProvider: Send + Sync {
    async fn current_persona_id(&self) -> String;
}

/// 固定人格（测试或无选择器时使用）
#[derive(Debug, Clone)]
pub struct FixedPersona(pub String);

#[async_trait]
impl PersonaProvider for FixedPersona {
    async fn current_persona_id(&self) -> String {
        self.0.clone()
    }
}
