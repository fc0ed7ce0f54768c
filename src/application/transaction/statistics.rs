use serde::{Deserialize, Serialize};

use crate::application::navigation::{EntityKind, NavigationBadge};
use crate::domain::TransactionStatus;

use super::errors::{Result, TransactionApplicationError};
use super::transaction_service::ServiceDependencies;

/// ダッシュボード用の件数集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub borrowed: u64,
    pub returned: u64,
    pub delayed: u64,
}

impl TransactionStats {
    pub fn total(&self) -> u64 {
        self.borrowed + self.returned + self.delayed
    }
}

/// ステータスごとの件数を集計する
pub async fn get_transaction_stats(deps: &ServiceDependencies) -> Result<TransactionStats> {
    let repository = &deps.transaction_repository;
    let (borrowed, returned, delayed) = futures::try_join!(
        repository.count_by_status(TransactionStatus::Borrowed),
        repository.count_by_status(TransactionStatus::Returned),
        repository.count_by_status(TransactionStatus::Delayed),
    )
    .map_err(TransactionApplicationError::RepositoryError)?;

    Ok(TransactionStats {
        borrowed,
        returned,
        delayed,
    })
}

/// ナビゲーションバッジを取得する
///
/// 件数はキャッシュから返し、キャッシュがなければリポジトリで数える。
pub async fn get_navigation_badge(deps: &ServiceDependencies) -> Result<NavigationBadge> {
    let count = deps
        .badge_cache
        .get_or_load(EntityKind::Transaction, || deps.transaction_repository.count())
        .await
        .map_err(TransactionApplicationError::RepositoryError)?;

    Ok(NavigationBadge::from_count(count))
}
