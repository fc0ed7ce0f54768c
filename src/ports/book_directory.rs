use crate::domain::value_objects::BookId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍ディレクトリポート
///
/// 貸出管理コンテキストと蔵書コンテキストの境界を維持する。
/// 貸出管理コンテキストはBookIDのみを知り、書籍詳細は知らない。
#[async_trait]
pub trait BookDirectory: Send + Sync {
    /// 書籍が貸出可能か確認する
    ///
    /// ビジネスルール: 貸出可能な書籍のみ新しい貸出記録に使用できる。
    /// 存在しない書籍は`false`を返す。
    async fn is_available(&self, book_id: BookId) -> Result<bool>;
}
