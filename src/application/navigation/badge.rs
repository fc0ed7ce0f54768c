use serde::{Deserialize, Serialize};

/// この件数を超えるとバッジの色が変わる
const HIGHLIGHT_THRESHOLD: u64 = 10;

/// ナビゲーションバッジの色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Info,
    Primary,
}

/// ナビゲーションバッジ（件数と色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationBadge {
    pub count: u64,
    pub color: BadgeColor,
}

impl NavigationBadge {
    /// 件数から色を決める（10件超でinfo、それ以外はprimary）
    pub fn from_count(count: u64) -> Self {
        let color = if count > HIGHLIGHT_THRESHOLD {
            BadgeColor::Info
        } else {
            BadgeColor::Primary
        };
        Self { count, color }
    }
}
