mod badge;
mod badge_cache;

pub use badge::{BadgeColor, NavigationBadge};
pub use badge_cache::{DEFAULT_BADGE_TTL, EntityKind, NavigationBadgeCache};
