pub mod accrual;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::PaymentFrequency;

pub use accrual::{
    complete_months, daily_interest, elapsed_days, monthly_interest, quote, quote_for_loan,
};

/// Accrued interest under both conventions at once.
///
/// Both figures are always computed so callers can display them side by side;
/// the loan's own payment frequency decides which one is authoritative for
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestQuote {
    pub daily_equivalent: Money,
    pub monthly_equivalent: Money,
    pub elapsed_days: u32,
}

impl InterestQuote {
    pub const ZERO: InterestQuote = InterestQuote {
        daily_equivalent: Money::ZERO,
        monthly_equivalent: Money::ZERO,
        elapsed_days: 0,
    };

    /// the figure that governs payment validation for the given frequency
    pub fn authoritative(&self, frequency: PaymentFrequency) -> Money {
        match frequency {
            PaymentFrequency::Daily => self.daily_equivalent,
            PaymentFrequency::Monthly => self.monthly_equivalent,
        }
    }
}
