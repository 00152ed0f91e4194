// Theme Domain
//
// 主题值对象

use serde::{Deserialize, Serialize};

/// 主题类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// 切换后的提示文本
    pub fn switched_toast(&self) -> &'static str {
        match self {
            Theme::Dark => "已切换到夜间模式",
            Theme::Light => "已切换到日间模式",
        }
    }

    pub fn appearance(&self) -> ThemeAppearance {
        match self {
            Theme::Dark => ThemeAppearance {
                theme: *self,
                icon: "☀️",
                toggle_title: "切换到日间主题",
                label: "日间模式",
            },
            Theme::Light => ThemeAppearance {
                theme: *self,
                icon: "🌙",
                toggle_title: "切换到夜间主题",
                label: "夜间模式",
            },
        }
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// 主题外观：切换按钮显示的是“切换到另一主题”的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeAppearance {
    pub theme: Theme,
    pub icon: &'static str,
    pub toggle_title: &'static str,
    pub label: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from("dark"), Theme::Dark);
        assert_eq!(Theme::from("DARK"), Theme::Dark);
        assert_eq!(Theme::from("light"), Theme::Light);
        assert_eq!(Theme::from("sepia"), Theme::Light);
    }

    #[test]
    fn test_dark_appearance_offers_day_mode() {
        let appearance = Theme::Dark.appearance();
        assert_eq!(appearance.icon, "☀️");
        assert_eq!(appearance.label, "日间模式");
        assert_eq!(Theme::Light.appearance().icon, "🌙");
    }
}
