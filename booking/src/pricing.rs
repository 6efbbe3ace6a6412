//! Price and deposit projection over the current selection.

use crate::draft::BookingDraft;
use crate::types::Money;

/// Deposit percentage applied when the salon does not specify one
pub const DEFAULT_DEPOSIT_PERCENTAGE: u8 = 25;

/// Price and duration summary projected from the current selection
///
/// A pure function of the draft, recomputed on every call; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSummary {
    /// Sum of the selected service prices
    pub total_price: Money,
    /// Sum of the selected service durations
    pub total_duration_minutes: u32,
    /// Percentage used for the deposit
    pub deposit_percentage: u8,
    /// Amount owed upfront
    pub deposit: Money,
    /// Amount remaining at the salon
    pub remaining: Money,
}

impl BookingSummary {
    /// Project the summary from the current draft
    #[must_use]
    pub fn project(draft: &BookingDraft) -> Self {
        let deposit_percentage = draft
            .salon
            .as_ref()
            .and_then(|s| s.deposit_percentage)
            .unwrap_or(DEFAULT_DEPOSIT_PERCENTAGE);
        let deposit = deposit_amount(draft.total_price, deposit_percentage);

        Self {
            total_price: draft.total_price,
            total_duration_minutes: draft.total_duration_minutes,
            deposit_percentage,
            deposit,
            remaining: draft.total_price - deposit,
        }
    }
}

/// Deposit owed upfront: `total * percentage / 100`, rounded half up
///
/// Round-half-up is the contract; tests pin it down since the remainder due
/// at the salon is derived from this amount.
#[must_use]
pub fn deposit_amount(total: Money, percentage: u8) -> Money {
    Money::from_francs((total.francs() * i64::from(percentage) + 50) / 100)
}
