use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::DomainEvent;

/// キャッシュの既定の有効期間
pub const DEFAULT_BADGE_TTL: Duration = Duration::from_secs(300);

/// バッジを持つエンティティの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Transaction,
}

#[derive(Debug, Clone, Copy)]
struct CachedCount {
    count: u64,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<EntityKind, CachedCount>,
    // 無効化のたびに進む。ロード中に無効化された値を保存しないために使う
    generations: HashMap<EntityKind, u64>,
}

impl CacheState {
    fn generation(&self, kind: EntityKind) -> u64 {
        self.generations.get(&kind).copied().unwrap_or(0)
    }
}

/// ナビゲーションバッジの件数キャッシュ
///
/// 件数が変わるイベント（作成・削除）で明示的に無効化される。
/// 無効化を取りこぼした場合に備えてTTLでも失効する。
#[derive(Debug)]
pub struct NavigationBadgeCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl NavigationBadgeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 有効なキャッシュ値を取得する
    pub fn get(&self, kind: EntityKind) -> Option<u64> {
        self.lock()
            .entries
            .get(&kind)
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.count)
    }

    pub fn put(&self, kind: EntityKind, count: u64) {
        Self::store(&mut self.lock(), kind, count);
    }

    fn store(state: &mut CacheState, kind: EntityKind, count: u64) {
        state.entries.insert(
            kind,
            CachedCount {
                count,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, kind: EntityKind) {
        let mut state = self.lock();
        state.entries.remove(&kind);
        *state.generations.entry(kind).or_insert(0) += 1;
    }

    /// ドメインイベントを受け取り、件数が変わる場合は無効化する
    pub fn on_event(&self, event: &DomainEvent) {
        if event.changes_record_count() {
            self.invalidate(EntityKind::Transaction);
            tracing::debug!(
                transaction_id = %event.transaction_id().value(),
                "navigation badge cache invalidated"
            );
        }
    }

    /// キャッシュ値を返す。なければ`load`で取得して保存する
    ///
    /// ロードの失敗はキャッシュせずにそのまま返す。
    /// ロード中に無効化された場合、読み込んだ値は返すが保存しない。
    pub async fn get_or_load<F, Fut, E>(&self, kind: EntityKind, load: F) -> Result<u64, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, E>>,
    {
        if let Some(count) = self.get(kind) {
            return Ok(count);
        }

        let generation = self.lock().generation(kind);
        let count = load().await?;

        let mut state = self.lock();
        if state.generation(kind) == generation {
            Self::store(&mut state, kind, count);
        } else {
            tracing::debug!("navigation badge count loaded during invalidation, not cached");
        }
        Ok(count)
    }
}

impl Default for NavigationBadgeCache {
    fn default() -> Self {
        Self::new(DEFAULT_BADGE_TTL)
    }
}
