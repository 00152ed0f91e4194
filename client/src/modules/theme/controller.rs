// Theme Controller
//
// 读取保存的主题并应用，切换时持久化并提示

use std::sync::Arc;
use std::time::Duration;

use super::{Theme, ThemeSurface};
use crate::infrastructure::{ClientEvent, EventBus};
use crate::modules::storage::{KeyValueStore, StoreError};

/// 主题存储键
pub const THEME_KEY: &str = "theme";

const TOAST_DURATION: Duration = Duration::from_millis(2000);

/// 主题控制器
pub struct ThemeController {
    store: Arc<dyn KeyValueStore>,
    surface: Arc<dyn ThemeSurface>,
    events: EventBus,
}

impl ThemeController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        surface: Arc<dyn ThemeSurface>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            surface,
            events,
        }
    }

    /// 当前保存的主题，未保存或读取失败时为 Light
    pub async fn current(&self) -> Theme {
        match self.store.get(THEME_KEY).await {
            Ok(saved) => saved
                .map(|s| Theme::from(s.as_str()))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("[ThemeController] Failed to read saved theme: {}", e);
                Theme::default()
            }
        }
    }

    /// 应用保存的主题
    pub async fn init(&self) -> Result<Theme, StoreError> {
        let theme = self.current().await;
        self.apply(theme).await?;
        Ok(theme)
    }

    /// 应用并保存主题
    pub async fn apply(&self, theme: Theme) -> Result<(), StoreError> {
        self.surface.apply_theme(&theme.appearance());
        self.store.set(THEME_KEY, theme.as_str()).await?;
        self.events.publish(ClientEvent::ThemeChanged { theme });
        Ok(())
    }

    /// 在日间与夜间之间切换
    pub async fn toggle(&self) -> Result<Theme, StoreError> {
        let next = self.current().await.toggled();
        self.apply(next).await?;
        self.surface.show_toast(next.switched_toast(), TOAST_DURATION);
        tracing::info!("[ThemeController] Switched to {}", next.as_str());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::infrastructure::RecordingRenderer;
    use crate::modules::storage::{InMemoryKeyValueStore, UnreadableStore};

    fn controller(
        store: Arc<InMemoryKeyValueStore>,
    ) -> (ThemeController, Arc<RecordingRenderer>) {
        let surface = Arc::new(RecordingRenderer::new());
        let controller = ThemeController::new(store, surface.clone(), EventBus::new());
        (controller, surface)
    }

    #[tokio::test]
    async fn test_init_defaults_to_light() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let (controller, surface) = controller(store.clone());

        assert_eq!(controller.init().await.unwrap(), Theme::Light);
        assert_eq!(surface.themes(), vec![Theme::Light.appearance()]);
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_init_applies_saved_theme() {
        let store = Arc::new(InMemoryKeyValueStore::with_values([(THEME_KEY, "dark")]));
        let (controller, surface) = controller(store);

        assert_eq!(controller.init().await.unwrap(), Theme::Dark);
        assert_eq!(surface.themes().last().unwrap().label, "日间模式");
        assert!(surface.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_store_falls_back_to_light() {
        let store = Arc::new(UnreadableStore::default());
        let surface = Arc::new(RecordingRenderer::new());
        let controller = ThemeController::new(store.clone(), surface.clone(), EventBus::new());

        assert_eq!(controller.current().await, Theme::Light);
        assert_eq!(controller.init().await.unwrap(), Theme::Light);
        assert_eq!(surface.themes(), vec![Theme::Light.appearance()]);
        assert_eq!(store.written(), vec![(THEME_KEY.to_string(), "light".to_string())]);
    }

    #[tokio::test]
    async fn test_toggle_persists_and_toasts() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let (controller, surface) = controller(store.clone());

        assert_eq!(controller.toggle().await.unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        assert_eq!(controller.toggle().await.unwrap(), Theme::Light);
        assert_eq!(
            surface.toasts(),
            vec![
                ("已切换到夜间模式".to_string(), TOAST_DURATION),
                ("已切换到日间模式".to_string(), TOAST_DURATION),
            ]
        );
    }
}
