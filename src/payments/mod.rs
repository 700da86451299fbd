pub mod allocator;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::interest::quote_for_loan;
use crate::loan::{Loan, Payment};

pub use allocator::allocate_and_validate;

/// a tendered payment before allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    /// accrual-comparison date; may be backdated relative to submission
    pub payment_date: NaiveDate,
    pub reference: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: Money, payment_date: NaiveDate) -> Self {
        Self {
            amount,
            payment_date,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// interest recorded on payments still awaiting verification
pub fn pending_interest(history: &[Payment]) -> Money {
    history.iter().filter(|p| p.is_pending()).map(|p| p.interest_amount).sum()
}

/// principal recorded on payments still awaiting verification
pub fn pending_principal(history: &[Payment]) -> Money {
    history.iter().filter(|p| p.is_pending()).map(|p| p.principal_amount).sum()
}

/// interest collected through verified payments
pub fn verified_interest(history: &[Payment]) -> Money {
    history.iter().filter(|p| p.is_verified()).map(|p| p.interest_amount).sum()
}

/// principal collected through verified payments
pub fn verified_principal(history: &[Payment]) -> Money {
    history.iter().filter(|p| p.is_verified()).map(|p| p.principal_amount).sum()
}

/// total amount received across pending and verified payments
pub fn total_received(history: &[Payment]) -> Money {
    history.iter().filter(|p| !p.is_rejected()).map(|p| p.amount).sum()
}

/// Interest still owed as of a date, at storage precision.
///
/// The gross accrued figure (authoritative convention for the loan's
/// frequency) minus interest already verified minus interest already sitting
/// on PENDING rows, floored at zero. Interest recorded on a pending row is
/// spoken for and cannot be charged to a second submission.
pub fn outstanding_interest(loan: &Loan, history: &[Payment], as_of: NaiveDate) -> Money {
    let accrued = quote_for_loan(loan, as_of).authoritative(loan.payment_frequency);
    (accrued - verified_interest(history) - pending_interest(history))
        .max(Money::ZERO)
        .stored()
}
