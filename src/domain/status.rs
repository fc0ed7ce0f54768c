use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ActorRole, Operation, ValidationError};

/// 貸出記録のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// 貸出中
    Borrowed,
    /// 期限内に返却済み
    Returned,
    /// 延滞して返却
    Delayed,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Borrowed,
        TransactionStatus::Returned,
        TransactionStatus::Delayed,
    ];

    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Delayed => "delayed",
        }
    }

    /// 返却済み（ReturnedまたはDelayed）か
    pub fn is_returned(&self) -> bool {
        !matches!(self, TransactionStatus::Borrowed)
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            "delayed" => Ok(TransactionStatus::Delayed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 純粋関数：日付からステータスを導出する
///
/// - 返却日なし → Borrowed
/// - 延滞日数 > 0 → Delayed
/// - それ以外 → Returned
pub fn resolve_status(returned_date: Option<NaiveDate>, delay_days: u64) -> TransactionStatus {
    match returned_date {
        None => TransactionStatus::Borrowed,
        Some(_) if delay_days > 0 => TransactionStatus::Delayed,
        Some(_) => TransactionStatus::Returned,
    }
}

/// 操作とロールに応じて選択可能なステータス
///
/// 新規作成時はBorrowedのみ。編集時はすべてのステータスを選択できる。
pub fn allowed_statuses(operation: Operation, _actor: ActorRole) -> &'static [TransactionStatus] {
    match operation {
        Operation::Create => &[TransactionStatus::Borrowed],
        Operation::Edit => &TransactionStatus::ALL,
    }
}

/// 申告されたステータスを検証する
///
/// ステータスは常に日付から導出される。申告値が選択肢外、
/// または導出値と食い違う場合はエラーとして報告し、自動補正はしない。
pub fn check_declared_status(
    declared: Option<TransactionStatus>,
    computed: TransactionStatus,
    operation: Operation,
    actor: ActorRole,
) -> Result<(), ValidationError> {
    let Some(declared) = declared else {
        return Ok(());
    };

    if !allowed_statuses(operation, actor).contains(&declared) {
        return Err(ValidationError::StatusNotAllowed {
            declared,
            operation,
        });
    }

    if declared != computed {
        return Err(ValidationError::StatusMismatch { declared, computed });
    }

    Ok(())
}
