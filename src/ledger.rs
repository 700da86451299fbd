use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;

use crate::cashback::{awards_for_payment, CashbackAward};
use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{quote_for_loan, InterestQuote};
use crate::lifecycle::{close_loan, split_loan, SplitDecision};
use crate::loan::{Loan, Payment};
use crate::payments::{allocate_and_validate, outstanding_interest, PaymentRequest};
use crate::summary::LoanSummary;
use crate::types::{AllocationDecision, DeclineReason, PaymentId, PaymentSplit, PaymentStatus};

/// outcome of a payment submission through the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted {
        payment_id: PaymentId,
        split: PaymentSplit,
    },
    Declined(DeclineReason),
}

/// outcome of verifying a pending payment
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub payment_id: PaymentId,
    pub principal_applied: Money,
    pub new_remaining_principal: Money,
    pub paid_off: bool,
    pub cashback: Vec<CashbackAward>,
}

/// One loan's book of record: the loan, its ordered payment history, and the
/// events produced while operating on them.
///
/// All operations run to completion in memory with no I/O. The caller owns
/// persistence and must serialize access per loan (at most one in-flight
/// mutating operation at a time), or two concurrent submissions could both
/// pass the outstanding-interest ceiling.
#[derive(Debug)]
pub struct LoanLedger {
    pub loan: Loan,
    pub payments: Vec<Payment>,
    pub events: EventStore,
}

impl LoanLedger {
    /// originate a new loan and open its ledger
    pub fn originate(
        terms: LoanTerms,
        customer_id: impl Into<String>,
        name: impl Into<String>,
        time: &SafeTimeProvider,
    ) -> Result<Self> {
        let now = time.now();
        let loan = Loan::originate(terms, customer_id, name, now)?;

        let mut events = EventStore::new();
        events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal: loan.principal_amount,
            timestamp: now,
        });

        Ok(Self {
            loan,
            payments: Vec::new(),
            events,
        })
    }

    /// reopen a ledger from persisted records
    pub fn from_parts(loan: Loan, payments: Vec<Payment>) -> Self {
        Self {
            loan,
            payments,
            events: EventStore::new(),
        }
    }

    /// Submit a tendered payment.
    ///
    /// Runs the allocator against the current history; an accepted submission
    /// is recorded as a PENDING payment whose interest portion immediately
    /// counts against later submissions. Declines are returned, not thrown.
    pub fn submit_payment(
        &mut self,
        request: PaymentRequest,
        time: &SafeTimeProvider,
    ) -> Result<Submission> {
        if !self.loan.can_accept_payment() {
            return Err(LedgerError::LoanNotActive { status: self.loan.status });
        }

        let now = time.now();
        let decision =
            allocate_and_validate(&self.loan, &self.payments, request.amount, request.payment_date)?;

        match decision {
            AllocationDecision::Accepted(split) => {
                let payment = Payment::new_pending(
                    self.loan.id,
                    request.amount.stored(),
                    request.payment_date,
                    split,
                    request.reference,
                    now,
                );

                self.events.emit(Event::PaymentSubmitted {
                    loan_id: self.loan.id,
                    payment_id: payment.id,
                    amount: payment.amount,
                    interest_amount: payment.interest_amount,
                    principal_amount: payment.principal_amount,
                    payment_date: payment.payment_date,
                    timestamp: now,
                });

                let payment_id = payment.id;
                self.payments.push(payment);
                Ok(Submission::Accepted { payment_id, split })
            }
            AllocationDecision::Declined(reason) => {
                self.events.emit(Event::PaymentDeclined {
                    loan_id: self.loan.id,
                    amount: request.amount,
                    payment_date: request.payment_date,
                    reason,
                    timestamp: now,
                });
                Ok(Submission::Declined(reason))
            }
        }
    }

    /// Verify a pending payment: apply its principal portion to the balance,
    /// transition to PAID_OFF at zero, and compute cashback awards.
    pub fn verify_payment(
        &mut self,
        payment_id: PaymentId,
        time: &SafeTimeProvider,
    ) -> Result<VerificationOutcome> {
        if !self.loan.is_active() {
            return Err(LedgerError::LoanNotActive { status: self.loan.status });
        }

        let now = time.now();
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(LedgerError::PaymentNotFound { payment_id })?;

        if !payment.is_pending() {
            return Err(LedgerError::PaymentNotPending {
                payment_id,
                status: payment.status,
            });
        }

        payment.status = PaymentStatus::Verified;
        let principal_applied = payment.principal_amount;
        let verified = payment.clone();

        let paid_off = self.loan.apply_verified_principal(principal_applied);

        self.events.emit(Event::PaymentVerified {
            loan_id: self.loan.id,
            payment_id,
            principal_applied,
            new_remaining_principal: self.loan.remaining_principal,
            timestamp: now,
        });

        if paid_off {
            self.events.emit(Event::LoanPaidOff {
                loan_id: self.loan.id,
                timestamp: now,
            });
        }

        let cashback = awards_for_payment(&self.loan.cashback_rules, &verified);
        for award in &cashback {
            self.events.emit(Event::CashbackAccrued {
                loan_id: award.loan_id,
                payment_id: award.payment_id,
                recipient: award.recipient.clone(),
                points: award.points,
                timestamp: now,
            });
        }

        Ok(VerificationOutcome {
            payment_id,
            principal_applied,
            new_remaining_principal: self.loan.remaining_principal,
            paid_off,
            cashback,
        })
    }

    /// decline a pending payment; its interest stops counting anywhere
    pub fn reject_payment(&mut self, payment_id: PaymentId, time: &SafeTimeProvider) -> Result<()> {
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(LedgerError::PaymentNotFound { payment_id })?;

        if !payment.is_pending() {
            return Err(LedgerError::PaymentNotPending {
                payment_id,
                status: payment.status,
            });
        }

        payment.status = PaymentStatus::Rejected;
        self.events.emit(Event::PaymentRejected {
            loan_id: self.loan.id,
            payment_id,
            timestamp: time.now(),
        });
        Ok(())
    }

    /// administratively close the loan; history is preserved unmodified
    pub fn close(&mut self, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();
        close_loan(&mut self.loan, now)?;

        self.events.emit(Event::LoanClosed {
            loan_id: self.loan.id,
            remaining_principal: self.loan.remaining_principal,
            timestamp: now,
        });
        Ok(())
    }

    /// Split the loan's remaining principal into new loans.
    ///
    /// On completion this ledger holds the closed original with its re-linked
    /// history; the resulting loans in the returned outcome are new records
    /// for the caller to persist in the same transaction as this ledger's
    /// state, or not at all.
    pub fn split(
        &mut self,
        allocations: &[Money],
        time: &SafeTimeProvider,
    ) -> Result<SplitDecision> {
        let now = time.now();
        let decision = split_loan(&self.loan, &self.payments, allocations, now)?;

        if let SplitDecision::Completed(outcome) = &decision {
            self.loan = outcome.closed_original.clone();
            self.payments = outcome.relinked_payments.clone();

            self.events.emit(Event::LoanSplitPerformed {
                original_loan_id: outcome.record.original_loan_id,
                resulting_loan_ids: outcome.record.resulting_loan_ids.clone(),
                split_on: outcome.record.split_on,
                timestamp: now,
            });
        }

        Ok(decision)
    }

    /// accrued interest under both conventions as of a date
    pub fn quote(&self, as_of: NaiveDate) -> InterestQuote {
        quote_for_loan(&self.loan, as_of)
    }

    /// interest still owed as of a date, net of verified and pending rows
    pub fn outstanding_interest(&self, as_of: NaiveDate) -> Money {
        outstanding_interest(&self.loan, &self.payments, as_of)
    }

    /// read-only figures for reports and digests
    pub fn summary(&self, as_of: NaiveDate) -> LoanSummary {
        LoanSummary::compute(&self.loan, &self.payments, as_of)
    }

    /// drain accumulated events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
