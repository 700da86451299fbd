use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// accrual-period granularity for a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    /// interest accrues per day on the 360-day year
    Daily,
    /// interest accrues in whole 30-day steps
    Monthly,
}

/// loan product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    /// payments reduce principal once interest is satisfied
    Regular,
    /// ordinary payments never reduce principal
    InterestOnly,
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// accepting payments, accruing interest
    Active,
    /// closed by administrative action; history preserved, no forward accrual
    Closed,
    /// remaining principal reached zero through verified payments
    PaidOff,
}

/// payment verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// submitted, awaiting admin verification; interest portion already
    /// counts against the validation ceiling
    Pending,
    /// verified; principal portion applied to the loan balance
    Verified,
    /// declined by admin; no longer counts anywhere
    Rejected,
}

/// what a payment's split covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    Interest,
    InterestAndPrincipal,
}

/// machine-readable reason a submission or split was declined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    InvalidAmount,
    PredatesLoan,
    ExceedsOutstandingInterest,
    AllocationMismatch,
}

impl DeclineReason {
    /// stable reason code for callers that surface declines to end users
    pub fn code(&self) -> &'static str {
        match self {
            DeclineReason::InvalidAmount => "invalid amount",
            DeclineReason::PredatesLoan => "predates loan",
            DeclineReason::ExceedsOutstandingInterest => "exceeds outstanding interest",
            DeclineReason::AllocationMismatch => "allocation mismatch",
        }
    }
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// the allocator's division of a tendered amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub interest_amount: Money,
    pub principal_amount: Money,
    pub kind: PaymentKind,
}

impl PaymentSplit {
    pub fn interest_only(interest: Money) -> Self {
        Self {
            interest_amount: interest,
            principal_amount: Money::ZERO,
            kind: PaymentKind::Interest,
        }
    }

    pub fn with_principal(interest: Money, principal: Money) -> Self {
        Self {
            interest_amount: interest,
            principal_amount: principal,
            kind: if principal.is_positive() {
                PaymentKind::InterestAndPrincipal
            } else {
                PaymentKind::Interest
            },
        }
    }

    pub fn total(&self) -> Money {
        self.interest_amount + self.principal_amount
    }
}

/// outcome of payment validation: a split to record, or a structured decline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AllocationDecision {
    Accepted(PaymentSplit),
    Declined(DeclineReason),
}

impl AllocationDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AllocationDecision::Accepted(_))
    }

    pub fn split(&self) -> Option<&PaymentSplit> {
        match self {
            AllocationDecision::Accepted(split) => Some(split),
            AllocationDecision::Declined(_) => None,
        }
    }
}
