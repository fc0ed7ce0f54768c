use crate::domain::value_objects::UserId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ユーザーディレクトリポート
///
/// 貸出管理コンテキストと利用者管理コンテキストの境界を維持する。
/// 貸出管理コンテキストはUserIDのみを知り、ロールや状態の管理は行わない。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 利用者が借り手ロールを持つか確認する
    ///
    /// 存在しない利用者は`false`を返す。
    async fn is_borrower(&self, user_id: UserId) -> Result<bool>;

    /// 利用者が有効か確認する
    ///
    /// ビジネスルール: 無効化された借り手には貸し出せない。
    async fn is_enabled(&self, user_id: UserId) -> Result<bool>;

    /// 利用者名を取得する
    ///
    /// 管理者向け通知のメッセージに使用される。
    async fn get_user_name(&self, user_id: UserId) -> Result<Option<String>>;
}
