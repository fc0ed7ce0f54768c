use crate::domain::{
    Transaction, TransactionStatus,
    value_objects::{TransactionId, UserId},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 一覧取得の絞り込み条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub borrower_id: Option<UserId>,
}

/// 貸出記録リポジトリポート
///
/// 貸出記録の完全な状態を保存する。延滞料金とステータスは
/// ドメイン層で確定済みの値をそのまま保存し、ここでは再計算しない。
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// 新しい貸出記録を保存する
    async fn insert(&self, transaction: &Transaction) -> Result<()>;

    /// 既存の貸出記録を更新する
    ///
    /// 該当する記録がない場合は`false`を返す。
    async fn update(&self, transaction: &Transaction) -> Result<bool>;

    /// 貸出記録を削除する
    ///
    /// 該当する記録がない場合は`false`を返す。
    async fn delete(&self, transaction_id: TransactionId) -> Result<bool>;

    /// IDで貸出記録を取得する
    async fn get_by_id(&self, transaction_id: TransactionId) -> Result<Option<Transaction>>;

    /// 貸出記録を検索する（貸出日の新しい順）
    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>>;

    /// 全貸出記録の件数
    ///
    /// ナビゲーションバッジに使用される。
    async fn count(&self) -> Result<u64>;

    /// ステータスごとの件数
    async fn count_by_status(&self, status: TransactionStatus) -> Result<u64>;
}
