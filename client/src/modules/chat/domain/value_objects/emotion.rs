use serde::{Deserialize, Serialize};

/// 未收录情绪标签时使用的图标
pub const DEFAULT_EMOTION_ICON: &str = "😊";

/// 情绪标签 → 图标
const EMOTION_ICONS: &[(&str, &str)] = &[
    ("难过", "😢"),
    ("开心", "😊"),
    ("生气", "😠"),
    ("疲惫", "😴"),
    ("焦虑", "😰"),
    ("兴奋", "🤩"),
    ("害怕", "😨"),
    ("厌恶", "🤮"),
    ("恐惧", "😱"),
    ("惊讶", "😲"),
    ("中性", "😐"),
];

/// 按极性下标排列的徽标文本
pub const POLARITY_BADGES: [&str; 3] = ["失望", "平常", "开心"];

/// 查找情绪图标，未知标签回退到默认图标
pub fn emotion_icon(label: &str) -> &'static str {
    EMOTION_ICONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_EMOTION_ICON)
}

/// 情感极性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Negative,
    Neutral,
    Positive,
}

impl Polarity {
    /// 从服务端下标（0–2）解析
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Polarity::Negative),
            1 => Some(Polarity::Neutral),
            2 => Some(Polarity::Positive),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Polarity::Negative => 0,
            Polarity::Neutral => 1,
            Polarity::Positive => 2,
        }
    }

    pub fn badge(&self) -> &'static str {
        POLARITY_BADGES[self.index()]
    }
}

/// 情感快照
///
/// 值对象：随成功的助手回复一起返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    /// 情绪标签（中文）
    pub emotion: String,
    /// 极性下标，0 负面 / 1 中性 / 2 正面
    pub polarity: i64,
    /// 置信度 0.0–1.0
    pub confidence: f64,
}

impl EmotionSnapshot {
    pub fn new(emotion: impl Into<String>, polarity: i64, confidence: f64) -> Self {
        Self {
            emotion: emotion.into(),
            polarity,
            confidence,
        }
    }

    pub fn polarity(&self) -> Option<Polarity> {
        Polarity::from_index(self.polarity)
    }

    pub fn icon(&self) -> &'static str {
        emotion_icon(&self.emotion)
    }

    /// 极性徽标，下标越界时为空串
    pub fn badge(&self) -> &'static str {
        self.polarity().map(|p| p.badge()).unwrap_or("")
    }

    /// 置信度百分比（四舍五入）
    pub fn confidence_percent(&self) -> i64 {
        (self.confidence * 100.0).round() as i64
    }
}

/// 情绪指示器的显示内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionIndicator {
    pub icon: String,
    pub label: String,
    pub badge: String,
    pub confidence_text: String,
}

impl From<&EmotionSnapshot> for EmotionIndicator {
    fn from(snapshot: &EmotionSnapshot) -> Self {
        Self {
            icon: snapshot.icon().to_string(),
            label: snapshot.emotion.clone(),
            badge: snapshot.badge().to_string(),
            confidence_text: format!("置信度 {}%", snapshot.confidence_percent()),
        }
    }
}
