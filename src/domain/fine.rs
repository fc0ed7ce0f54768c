use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Fine;

/// 延滞1日あたりの料金（通貨単位）
pub const FINE_PER_DAY: u64 = 10;

/// 延滞料金の算定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineAssessment {
    pub delay_days: u64,
    pub fine: Fine,
}

impl FineAssessment {
    pub const NONE: FineAssessment = FineAssessment {
        delay_days: 0,
        fine: Fine::ZERO,
    };

    /// 画面表示用の内訳（例: "5 Days x $10 = $50.00"）
    pub fn breakdown(&self) -> String {
        format!(
            "{} Days x ${} = ${}.00",
            self.delay_days,
            FINE_PER_DAY,
            self.fine.value()
        )
    }
}

/// 返却期限 = 貸出日 + 貸出日数
///
/// 暦の範囲を超える場合は`None`。
pub fn due_date(borrowed_date: NaiveDate, borrowed_for_days: u32) -> Option<NaiveDate> {
    borrowed_date.checked_add_days(Days::new(u64::from(borrowed_for_days)))
}

/// 純粋関数：延滞日数と延滞料金を算定する
///
/// ビジネスルール：
/// - 返却日なし → (0, 0)
/// - 返却日が返却期限以前（期限当日を含む） → (0, 0)
/// - それ以外 → 延滞日数 = 期限から返却日までの日数、料金 = 延滞日数 × 10
///
/// 貸出日数は0〜30に限定しない。返却日が貸出日より前でないことの検証は呼び出し側の責務。
pub fn compute_fine(
    borrowed_date: NaiveDate,
    borrowed_for_days: u32,
    returned_date: Option<NaiveDate>,
) -> FineAssessment {
    let Some(returned_date) = returned_date else {
        return FineAssessment::NONE;
    };

    // 期限が暦の範囲外なら、それより後の返却日は存在しない
    let Some(due) = due_date(borrowed_date, borrowed_for_days) else {
        return FineAssessment::NONE;
    };

    if returned_date <= due {
        return FineAssessment::NONE;
    }

    let delay_days = (returned_date - due).num_days().unsigned_abs();

    FineAssessment {
        delay_days,
        fine: Fine::from_units(delay_days * FINE_PER_DAY),
    }
}
