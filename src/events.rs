use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{DeclineReason, LoanId, PaymentId};

/// all events emitted by ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        timestamp: DateTime<Utc>,
    },
    LoanClosed {
        loan_id: LoanId,
        remaining_principal: Money,
        timestamp: DateTime<Utc>,
    },
    LoanPaidOff {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanSplitPerformed {
        original_loan_id: LoanId,
        resulting_loan_ids: Vec<LoanId>,
        split_on: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentSubmitted {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        interest_amount: Money,
        principal_amount: Money,
        payment_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PaymentDeclined {
        loan_id: LoanId,
        amount: Money,
        payment_date: NaiveDate,
        reason: DeclineReason,
        timestamp: DateTime<Utc>,
    },
    PaymentVerified {
        loan_id: LoanId,
        payment_id: PaymentId,
        principal_applied: Money,
        new_remaining_principal: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentRejected {
        loan_id: LoanId,
        payment_id: PaymentId,
        timestamp: DateTime<Utc>,
    },
    PaymentReassigned {
        payment_id: PaymentId,
        from_loan_id: LoanId,
        to_loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // cashback events
    CashbackAccrued {
        loan_id: LoanId,
        payment_id: PaymentId,
        recipient: String,
        points: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
