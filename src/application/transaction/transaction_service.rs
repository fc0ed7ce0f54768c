use crate::application::navigation::NavigationBadgeCache;
use crate::domain::{
    self, DomainEvent, FineAssessment, PreconditionError, Transaction, commands::*,
    value_objects::*,
};
use crate::ports::*;
use chrono::NaiveDate;
use std::sync::Arc;

use super::errors::{Result, TransactionApplicationError};
use super::notifications::notify_admins;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub transaction_repository: Arc<dyn TransactionRepository>,
    pub book_directory: Arc<dyn BookDirectory>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub notification_sink: Arc<dyn NotificationSink>,
    pub badge_cache: Arc<NavigationBadgeCache>,
}

/// リポジトリから貸出記録を取得するヘルパー関数
///
/// # エラー
/// - RepositoryError: 読み込み失敗
/// - TransactionNotFound: 記録が存在しない
async fn load_transaction(
    repository: &Arc<dyn TransactionRepository>,
    transaction_id: TransactionId,
) -> Result<Transaction> {
    repository
        .get_by_id(transaction_id)
        .await
        .map_err(TransactionApplicationError::RepositoryError)?
        .ok_or(TransactionApplicationError::TransactionNotFound)
}

/// 書籍が貸出可能であることを確認する
async fn ensure_book_available(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let available = deps
        .book_directory
        .is_available(book_id)
        .await
        .map_err(TransactionApplicationError::BookDirectoryError)?;

    if !available {
        return Err(PreconditionError::BookNotAvailable.into());
    }

    Ok(())
}

/// 利用者が有効な借り手であることを確認する
///
/// ロールと有効状態の問い合わせは並行して行う。
async fn ensure_active_borrower(deps: &ServiceDependencies, borrower_id: UserId) -> Result<()> {
    let (is_borrower, is_enabled) = futures::try_join!(
        deps.user_directory.is_borrower(borrower_id),
        deps.user_directory.is_enabled(borrower_id),
    )
    .map_err(TransactionApplicationError::UserDirectoryError)?;

    if !is_borrower {
        return Err(PreconditionError::UserNotBorrower.into());
    }
    if !is_enabled {
        return Err(PreconditionError::BorrowerDisabled.into());
    }

    Ok(())
}

/// 書き込み後のイベント処理（バッジ無効化と管理者通知）
async fn publish(deps: &ServiceDependencies, event: DomainEvent) {
    deps.badge_cache.on_event(&event);
    notify_admins(deps, &event).await;
}

/// 貸出を記録する
///
/// ビジネスルール：
/// - 入力値が妥当であること（貸出期間0〜30日、申告ステータスはBorrowedのみ）
/// - 書籍が貸出可能であること
/// - 借り手が借り手ロールを持ち、有効であること
///
/// 検証（純粋）→ 前提条件（ディレクトリ問い合わせ）→ 保存の順に行い、
/// 失敗した場合は何も保存しない。
///
/// # 戻り値
/// 保存された貸出記録
pub async fn create_transaction(
    deps: &ServiceDependencies,
    cmd: CreateTransaction,
) -> Result<Transaction> {
    // 1. ドメイン層の純粋関数を呼び出し（検証）
    let (transaction, event) = domain::transaction::create_transaction(&cmd)?;

    // 2. 前提条件の確認
    ensure_book_available(deps, cmd.book_id).await?;
    ensure_active_borrower(deps, cmd.borrower_id).await?;

    // 3. 保存
    deps.transaction_repository
        .insert(&transaction)
        .await
        .map_err(TransactionApplicationError::RepositoryError)?;

    tracing::info!(
        transaction_id = %transaction.transaction_id.value(),
        book_id = %transaction.book_id.value(),
        borrower_id = %transaction.borrower_id.value(),
        actor = %cmd.actor,
        "transaction created"
    );

    // 4. イベント処理
    publish(deps, DomainEvent::TransactionCreated(event)).await;

    Ok(transaction)
}

/// 返却を記録する
///
/// ビジネスルール：
/// - 貸出記録が存在すること
/// - Borrowedからのみ遷移する
/// - 同じ返却日での再実行は何も書き込まずに現在の記録を返す
///
/// # 戻り値
/// 返却後の貸出記録
pub async fn record_return(deps: &ServiceDependencies, cmd: RecordReturn) -> Result<Transaction> {
    // 1. リポジトリから貸出記録を取得
    let transaction = load_transaction(&deps.transaction_repository, cmd.transaction_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let (returned, event) = domain::transaction::record_return(&transaction, &cmd)?;

    let Some(event) = event else {
        tracing::debug!(
            transaction_id = %cmd.transaction_id.value(),
            "return already recorded with the same date"
        );
        return Ok(returned);
    };

    // 3. 保存
    let updated = deps
        .transaction_repository
        .update(&returned)
        .await
        .map_err(TransactionApplicationError::RepositoryError)?;

    if !updated {
        return Err(TransactionApplicationError::TransactionNotFound);
    }

    tracing::info!(
        transaction_id = %returned.transaction_id.value(),
        status = %returned.status(),
        fine = returned.fine().value(),
        actor = %cmd.actor,
        "return recorded"
    );

    // 4. イベント処理
    publish(deps, DomainEvent::TransactionReturned(event)).await;

    Ok(returned)
}

/// 貸出記録を編集する
///
/// ビジネスルール：
/// - 貸出記録が存在すること
/// - 書籍を変更した場合は新しい書籍が貸出可能であること
/// - 借り手を変更した場合は新しい借り手が有効な借り手であること
/// - 日付項目が変わった場合は延滞料金とステータスを再計算する
///
/// # 戻り値
/// 編集後の貸出記録
pub async fn edit_transaction(
    deps: &ServiceDependencies,
    cmd: EditTransaction,
) -> Result<Transaction> {
    // 1. リポジトリから貸出記録を取得
    let transaction = load_transaction(&deps.transaction_repository, cmd.transaction_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し（検証と再計算）
    let (edited, event) = domain::transaction::edit_transaction(&transaction, &cmd)?;

    // 3. 変更された参照のみ前提条件を再確認
    if edited.book_id != transaction.book_id {
        ensure_book_available(deps, edited.book_id).await?;
    }
    if edited.borrower_id != transaction.borrower_id {
        ensure_active_borrower(deps, edited.borrower_id).await?;
    }

    // 4. 保存
    let updated = deps
        .transaction_repository
        .update(&edited)
        .await
        .map_err(TransactionApplicationError::RepositoryError)?;

    if !updated {
        return Err(TransactionApplicationError::TransactionNotFound);
    }

    tracing::info!(
        transaction_id = %edited.transaction_id.value(),
        previous_status = %event.previous_status,
        status = %event.status,
        recalculated = event.recalculated,
        actor = %cmd.actor,
        "transaction edited"
    );

    // 5. イベント処理
    publish(deps, DomainEvent::TransactionEdited(event)).await;

    Ok(edited)
}

/// 貸出記録を削除する
pub async fn delete_transaction(deps: &ServiceDependencies, cmd: DeleteTransaction) -> Result<()> {
    let transaction = load_transaction(&deps.transaction_repository, cmd.transaction_id).await?;

    let event = domain::transaction::delete_transaction(&transaction, &cmd);

    let deleted = deps
        .transaction_repository
        .delete(cmd.transaction_id)
        .await
        .map_err(TransactionApplicationError::RepositoryError)?;

    if !deleted {
        return Err(TransactionApplicationError::TransactionNotFound);
    }

    tracing::info!(
        transaction_id = %cmd.transaction_id.value(),
        actor = %cmd.actor,
        "transaction deleted"
    );

    publish(deps, DomainEvent::TransactionDeleted(event)).await;

    Ok(())
}

/// IDで貸出記録を取得する
pub async fn get_transaction(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<Transaction> {
    load_transaction(&deps.transaction_repository, transaction_id).await
}

/// 貸出記録を検索する
pub async fn list_transactions(
    deps: &ServiceDependencies,
    filter: TransactionFilter,
) -> Result<Vec<Transaction>> {
    deps.transaction_repository
        .list(filter)
        .await
        .map_err(TransactionApplicationError::RepositoryError)
}

/// 延滞料金の試算（保存しない）
///
/// 入力フォームで返却日を入れた時点の料金表示に使用される。
/// 保存時と同じ検証を行う。
pub fn preview_fine(
    borrowed_date: NaiveDate,
    borrowed_for_days: i64,
    returned_date: Option<NaiveDate>,
) -> Result<FineAssessment> {
    let borrowed_for = LoanPeriod::try_from(borrowed_for_days)?;
    let state = domain::transaction::settle(borrowed_date, borrowed_for, returned_date)?;

    Ok(FineAssessment {
        delay_days: state.delay_days(),
        fine: state.fine(),
    })
}
