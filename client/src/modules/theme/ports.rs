// Theme Surface Port

use std::time::Duration;

/// 主题显示端口
pub trait ThemeSurface: Send + Sync {
    /// 应用主题外观
    fn apply_theme(&self, appearance: &super::ThemeAppearance);

    /// 显示短暂提示
    fn show_toast(&self, message: &str, duration: Duration);
}
