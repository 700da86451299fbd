use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{LoanType, PaymentFrequency};

/// Terms captured on a loan at creation time.
///
/// The annual rate is copied onto each loan record and never read from shared
/// state, so repricing one loan can never retroactively change another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub payment_frequency: PaymentFrequency,
    pub loan_type: LoanType,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        payment_frequency: PaymentFrequency,
        loan_type: LoanType,
    ) -> Self {
        Self {
            principal,
            annual_rate,
            payment_frequency,
            loan_type,
        }
    }

    /// regular daily-accrual loan
    pub fn regular_daily(principal: Money, annual_rate: Rate) -> Self {
        Self::new(principal, annual_rate, PaymentFrequency::Daily, LoanType::Regular)
    }

    /// regular monthly-accrual loan
    pub fn regular_monthly(principal: Money, annual_rate: Rate) -> Self {
        Self::new(principal, annual_rate, PaymentFrequency::Monthly, LoanType::Regular)
    }

    /// interest-only daily-accrual loan
    pub fn interest_only_daily(principal: Money, annual_rate: Rate) -> Self {
        Self::new(principal, annual_rate, PaymentFrequency::Daily, LoanType::InterestOnly)
    }

    /// interest-only monthly-accrual loan
    pub fn interest_only_monthly(principal: Money, annual_rate: Rate) -> Self {
        Self::new(principal, annual_rate, PaymentFrequency::Monthly, LoanType::InterestOnly)
    }

    /// validate before origination: positive principal, rate within 0%..=100%
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LedgerError::InvalidTerms {
                message: format!("principal must be positive, got {}", self.principal),
            });
        }
        if self.annual_rate < Rate::ZERO || self.annual_rate > Rate::ONE {
            return Err(LedgerError::InvalidTerms {
                message: format!("annual rate must be between 0% and 100%, got {}", self.annual_rate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_presets() {
        let terms = LoanTerms::regular_daily(Money::from_major(100_000), Rate::from_percentage(12));
        assert_eq!(terms.payment_frequency, PaymentFrequency::Daily);
        assert_eq!(terms.loan_type, LoanType::Regular);
        assert!(terms.validate().is_ok());

        let terms = LoanTerms::interest_only_monthly(Money::from_major(50_000), Rate::from_percentage(18));
        assert_eq!(terms.payment_frequency, PaymentFrequency::Monthly);
        assert_eq!(terms.loan_type, LoanType::InterestOnly);
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let terms = LoanTerms::regular_daily(Money::from_major(1_000), Rate::ZERO);
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_terms() {
        let terms = LoanTerms::regular_daily(Money::ZERO, Rate::from_percentage(12));
        assert!(terms.validate().is_err());

        let terms = LoanTerms::regular_daily(
            Money::from_major(1_000),
            Rate::from_decimal(dec!(1.5)),
        );
        assert!(terms.validate().is_err());

        let terms = LoanTerms::regular_daily(
            Money::from_major(1_000),
            Rate::from_decimal(dec!(-0.05)),
        );
        assert!(terms.validate().is_err());
    }
}
