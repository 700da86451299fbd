use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, PaymentId, PaymentStatus};

/// Fatal conditions only. Expected business rejections (bad amount, ceiling
/// exceeded, mismatched split allocations) are returned as declined decisions
/// such as [`crate::types::AllocationDecision`], never as errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("interest + principal does not sum to payment amount: {interest} + {principal} != {amount}")]
    SplitSumMismatch {
        amount: Money,
        interest: Money,
        principal: Money,
    },

    #[error("split does not conserve principal: expected {expected}, got {actual}")]
    PrincipalNotConserved {
        expected: Money,
        actual: Money,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("payment {payment_id} is not pending: current status is {status:?}")]
    PaymentNotPending {
        payment_id: PaymentId,
        status: PaymentStatus,
    },

    #[error("payment not found: {payment_id}")]
    PaymentNotFound {
        payment_id: PaymentId,
    },

    #[error("loan {loan_id} is not a resulting loan of this split")]
    NotASplitMember {
        loan_id: LoanId,
    },

    #[error("invalid terms: {message}")]
    InvalidTerms {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
