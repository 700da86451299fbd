use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cashback::CashbackRule;
use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{
    LoanId, LoanStatus, LoanType, PaymentFrequency, PaymentId, PaymentKind, PaymentSplit,
    PaymentStatus,
};

/// Back-link carried by a loan produced by splitting another loan.
///
/// Historical accrual questions (dates on or before the split) are answered
/// from the recorded pre-split principal and the original creation date, so a
/// split never changes what was owed before it happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOrigin {
    pub original_loan_id: LoanId,
    pub pre_split_principal: Money,
    pub original_created_on: NaiveDate,
    pub split_on: NaiveDate,
}

/// a loan on the book of record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: String,
    pub name: String,

    /// original amount lent; immutable after creation
    pub principal_amount: Money,
    /// current outstanding principal; reduced only by verified principal
    /// portions or administrative adjustment
    pub remaining_principal: Money,
    /// annual rate captured at creation; never read from shared state
    pub interest_rate: Rate,
    pub payment_frequency: PaymentFrequency,
    pub loan_type: LoanType,

    /// accrual is always anchored here, never at the last payment date
    pub created_at: DateTime<Utc>,
    pub status: LoanStatus,
    pub closed_at: Option<DateTime<Utc>>,

    pub split_origin: Option<SplitOrigin>,
    pub cashback_rules: Vec<CashbackRule>,
    pub notes: Option<String>,
}

impl Loan {
    /// originate a loan from validated terms
    pub fn originate(
        terms: LoanTerms,
        customer_id: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        terms.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            name: name.into(),
            principal_amount: terms.principal,
            remaining_principal: terms.principal,
            interest_rate: terms.annual_rate,
            payment_frequency: terms.payment_frequency,
            loan_type: terms.loan_type,
            created_at,
            status: LoanStatus::Active,
            closed_at: None,
            split_origin: None,
            cashback_rules: Vec::new(),
            notes: None,
        })
    }

    /// the date accrual is measured from for a non-split loan
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// only active loans take new submissions or balance mutations
    pub fn can_accept_payment(&self) -> bool {
        self.is_active()
    }

    /// administrative close: forward-looking only, history untouched
    pub fn close(&mut self, at: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(LedgerError::LoanNotActive { status: self.status });
        }
        self.status = LoanStatus::Closed;
        self.closed_at = Some(at);
        Ok(())
    }

    /// Apply a verified payment's principal portion to the balance.
    ///
    /// Interest-only loans never reduce principal through ordinary payments.
    /// Returns true when the loan became fully paid off.
    pub fn apply_verified_principal(&mut self, principal: Money) -> bool {
        if self.loan_type == LoanType::InterestOnly {
            return false;
        }

        self.remaining_principal = (self.remaining_principal - principal).max(Money::ZERO);

        if self.remaining_principal.is_zero() {
            self.status = LoanStatus::PaidOff;
            true
        } else {
            false
        }
    }
}

/// a tendered payment and the split it was recorded with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,

    pub amount: Money,
    /// the date used for accrual comparison; may be backdated
    pub payment_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,

    pub kind: PaymentKind,
    pub interest_amount: Money,
    pub principal_amount: Money,
    pub status: PaymentStatus,
    pub reference: Option<String>,

    /// resulting loan this payment is attributed to after a split
    pub split_loan_id: Option<LoanId>,
    /// the loan's pre-split remaining principal, recorded so historical
    /// interest re-derivation never reads the live (changed) principal
    pub original_principal_amount: Option<Money>,
}

impl Payment {
    /// record an accepted submission; all payments start pending
    pub fn new_pending(
        loan_id: LoanId,
        amount: Money,
        payment_date: NaiveDate,
        split: PaymentSplit,
        reference: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            payment_date,
            submitted_at,
            kind: split.kind,
            interest_amount: split.interest_amount,
            principal_amount: split.principal_amount,
            status: PaymentStatus::Pending,
            reference,
            split_loan_id: None,
            original_principal_amount: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn is_verified(&self) -> bool {
        self.status == PaymentStatus::Verified
    }

    pub fn is_rejected(&self) -> bool {
        self.status == PaymentStatus::Rejected
    }
}
