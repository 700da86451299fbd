use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{Loan, Payment, SplitOrigin};
use crate::types::{DeclineReason, LoanId, LoanStatus};

/// point-in-time record of one loan being divided into several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSplit {
    pub id: Uuid,
    pub original_loan_id: LoanId,
    pub resulting_loan_ids: Vec<LoanId>,
    pub allocations: Vec<Money>,
    pub pre_split_principal: Money,
    pub split_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// outcome of a split validation: the complete new state, or a decline
#[derive(Debug, Clone, PartialEq)]
pub enum SplitDecision {
    Completed(SplitOutcome),
    Declined(DeclineReason),
}

/// Everything a committed split replaces, computed as one value.
///
/// The caller persists the whole outcome or none of it; a partially applied
/// split corrupts the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub record: LoanSplit,
    pub closed_original: Loan,
    pub resulting_loans: Vec<Loan>,
    pub relinked_payments: Vec<Payment>,
}

/// administrative close: stops forward accrual, freezes the balance,
/// alters no payment rows
pub fn close_loan(loan: &mut Loan, at: DateTime<Utc>) -> Result<()> {
    loan.close(at)
}

/// Divide a loan's remaining principal into new loans.
///
/// Each allocation must be positive and the allocations must sum exactly to
/// the remaining principal, otherwise the split is declined with
/// `AllocationMismatch`. On success the original is closed, every historical
/// payment is re-linked (attributed to the first resulting loan, carrying the
/// recorded pre-split principal), and each resulting loan accrues on its own
/// principal from the split date forward while still answering pre-split
/// accrual queries from the recorded history.
pub fn split_loan(
    loan: &Loan,
    payments: &[Payment],
    allocations: &[Money],
    at: DateTime<Utc>,
) -> Result<SplitDecision> {
    if !loan.is_active() {
        return Err(LedgerError::LoanNotActive { status: loan.status });
    }

    if allocations.is_empty() || allocations.iter().any(|a| !a.is_positive()) {
        tracing::debug!(loan_id = %loan.id, "split declined: non-positive allocation");
        return Ok(SplitDecision::Declined(DeclineReason::AllocationMismatch));
    }

    let allocated: Money = allocations.iter().copied().sum();
    if allocated != loan.remaining_principal {
        tracing::debug!(
            loan_id = %loan.id,
            %allocated,
            remaining = %loan.remaining_principal,
            "split declined: allocations do not sum to remaining principal"
        );
        return Ok(SplitDecision::Declined(DeclineReason::AllocationMismatch));
    }

    let split_on = at.date_naive();
    let origin = SplitOrigin {
        original_loan_id: loan.id,
        pre_split_principal: loan.remaining_principal,
        original_created_on: loan.created_on(),
        split_on,
    };

    let resulting_loans: Vec<Loan> = allocations
        .iter()
        .enumerate()
        .map(|(i, &allocation)| Loan {
            id: Uuid::new_v4(),
            customer_id: loan.customer_id.clone(),
            name: format!("{} - split {}", loan.name, i + 1),
            principal_amount: allocation,
            remaining_principal: allocation,
            interest_rate: loan.interest_rate,
            payment_frequency: loan.payment_frequency,
            loan_type: loan.loan_type,
            created_at: at,
            status: LoanStatus::Active,
            closed_at: None,
            split_origin: Some(origin),
            cashback_rules: loan.cashback_rules.clone(),
            notes: Some(format!("split from loan {}", loan.id)),
        })
        .collect();

    // conservation must hold after construction; a mismatch here is a bug in
    // this function, not bad input
    let resulting_total: Money = resulting_loans.iter().map(|l| l.remaining_principal).sum();
    if resulting_total != loan.remaining_principal {
        tracing::error!(
            loan_id = %loan.id,
            expected = %loan.remaining_principal,
            actual = %resulting_total,
            "split did not conserve principal"
        );
        return Err(LedgerError::PrincipalNotConserved {
            expected: loan.remaining_principal,
            actual: resulting_total,
        });
    }

    let mut closed_original = loan.clone();
    closed_original.status = LoanStatus::Closed;
    closed_original.closed_at = Some(at);

    let first_resulting = resulting_loans[0].id;
    let relinked_payments: Vec<Payment> = payments
        .iter()
        .map(|p| {
            let mut p = p.clone();
            if p.split_loan_id.is_none() {
                p.split_loan_id = Some(first_resulting);
            }
            p.original_principal_amount.get_or_insert(origin.pre_split_principal);
            p
        })
        .collect();

    let record = LoanSplit {
        id: Uuid::new_v4(),
        original_loan_id: loan.id,
        resulting_loan_ids: resulting_loans.iter().map(|l| l.id).collect(),
        allocations: allocations.to_vec(),
        pre_split_principal: origin.pre_split_principal,
        split_on,
        created_at: at,
    };

    Ok(SplitDecision::Completed(SplitOutcome {
        record,
        closed_original,
        resulting_loans,
        relinked_payments,
    }))
}

/// Re-attribute a historical payment to a different resulting loan of a split.
///
/// A verified payment's principal portion follows it: the new target's
/// remaining principal is reduced (clamped at zero) and a target settled down
/// to a cent or less is closed out.
pub fn reassign_payment_to_split(
    record: &LoanSplit,
    payment: &mut Payment,
    resulting_loans: &mut [Loan],
    to_loan_id: LoanId,
    at: DateTime<Utc>,
    events: &mut EventStore,
) -> Result<()> {
    if !record.resulting_loan_ids.contains(&to_loan_id) {
        return Err(LedgerError::NotASplitMember { loan_id: to_loan_id });
    }

    let target = resulting_loans
        .iter_mut()
        .find(|l| l.id == to_loan_id)
        .ok_or(LedgerError::NotASplitMember { loan_id: to_loan_id })?;

    let from_loan_id = payment.split_loan_id.unwrap_or(record.original_loan_id);
    payment.split_loan_id = Some(to_loan_id);
    payment.original_principal_amount.get_or_insert(record.pre_split_principal);

    if payment.is_verified() && !payment.principal_amount.is_zero() {
        target.remaining_principal =
            (target.remaining_principal - payment.principal_amount).max(Money::ZERO);

        if target.remaining_principal <= Money::CENT && target.is_active() {
            target.status = LoanStatus::Closed;
            target.closed_at = Some(at);
        }
    }

    events.emit(Event::PaymentReassigned {
        payment_id: payment.id,
        from_loan_id,
        to_loan_id,
        timestamp: at,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanTerms;
    use crate::decimal::Rate;
    use crate::interest::quote_for_loan;
    use crate::types::{PaymentSplit, PaymentStatus};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan_with_payment() -> (Loan, Vec<Payment>) {
        let loan = Loan::originate(
            LoanTerms::regular_daily(Money::from_major(100_000), Rate::from_percentage(12)),
            "cust-1",
            "original",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

        let split = PaymentSplit::with_principal(Money::from_major(1000), Money::from_major(500));
        let payment = Payment::new_pending(
            loan.id,
            split.total(),
            ymd(2024, 1, 31),
            split,
            None,
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        );
        (loan, vec![payment])
    }

    fn split_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_split_conserves_principal() {
        let (loan, payments) = loan_with_payment();
        let allocations = vec![Money::from_major(60_000), Money::from_major(40_000)];

        let decision = split_loan(&loan, &payments, &allocations, split_at()).unwrap();
        let outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        let total: Money = outcome.resulting_loans.iter().map(|l| l.remaining_principal).sum();
        assert_eq!(total, loan.remaining_principal);
        assert_eq!(outcome.closed_original.status, LoanStatus::Closed);
        assert!(outcome.resulting_loans.iter().all(|l| l.status == LoanStatus::Active));
        assert_eq!(outcome.record.resulting_loan_ids.len(), 2);
    }

    #[test]
    fn test_split_preserves_historical_accrual() {
        let (loan, payments) = loan_with_payment();
        let pre_split = quote_for_loan(&loan, ymd(2024, 1, 31));

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(40_000)],
            split_at(),
        )
        .unwrap();
        let outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        // every resulting loan answers pre-split queries with the pre-split figure
        for resulting in &outcome.resulting_loans {
            assert_eq!(quote_for_loan(resulting, ymd(2024, 1, 31)), pre_split);
        }

        // forward accrual runs per loan on its own principal
        let first = &outcome.resulting_loans[0];
        let after = quote_for_loan(first, ymd(2024, 3, 16)); // 30 days post split
        assert_eq!(after.daily_equivalent.stored(), Money::from_major(600));
    }

    #[test]
    fn test_split_relinks_history() {
        let (loan, payments) = loan_with_payment();

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(40_000)],
            split_at(),
        )
        .unwrap();
        let outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        let relinked = &outcome.relinked_payments[0];
        assert_eq!(relinked.split_loan_id, Some(outcome.resulting_loans[0].id));
        assert_eq!(relinked.original_principal_amount, Some(Money::from_major(100_000)));
        // the row itself is otherwise untouched
        assert_eq!(relinked.amount, payments[0].amount);
        assert_eq!(relinked.status, payments[0].status);
    }

    #[test]
    fn test_split_declines_mismatched_allocations() {
        let (loan, payments) = loan_with_payment();

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(30_000)],
            split_at(),
        )
        .unwrap();
        assert_eq!(decision, SplitDecision::Declined(DeclineReason::AllocationMismatch));

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(110_000), Money::from_major(-10_000)],
            split_at(),
        )
        .unwrap();
        assert_eq!(decision, SplitDecision::Declined(DeclineReason::AllocationMismatch));

        let decision = split_loan(&loan, &payments, &[], split_at()).unwrap();
        assert_eq!(decision, SplitDecision::Declined(DeclineReason::AllocationMismatch));
    }

    #[test]
    fn test_split_requires_active_loan() {
        let (mut loan, payments) = loan_with_payment();
        loan.close(split_at()).unwrap();

        let result = split_loan(&loan, &payments, &[Money::from_major(100_000)], split_at());
        assert!(matches!(result, Err(LedgerError::LoanNotActive { .. })));
    }

    #[test]
    fn test_reassign_moves_verified_principal() {
        let (loan, mut payments) = loan_with_payment();
        payments[0].status = PaymentStatus::Verified;

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(40_000)],
            split_at(),
        )
        .unwrap();
        let mut outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        let second = outcome.record.resulting_loan_ids[1];
        let mut payment = outcome.relinked_payments[0].clone();
        let mut events = EventStore::new();
        reassign_payment_to_split(
            &outcome.record,
            &mut payment,
            &mut outcome.resulting_loans,
            second,
            split_at(),
            &mut events,
        )
        .unwrap();

        assert_eq!(payment.split_loan_id, Some(second));
        assert_eq!(
            outcome.resulting_loans[1].remaining_principal,
            Money::from_major(39_500)
        );
        assert!(matches!(
            events.events()[0],
            Event::PaymentReassigned { to_loan_id, .. } if to_loan_id == second
        ));
    }

    #[test]
    fn test_reassign_auto_closes_settled_target() {
        let (loan, _) = loan_with_payment();
        let split = PaymentSplit::with_principal(Money::from_major(1000), Money::from_major(40_000));
        let mut payment = Payment::new_pending(
            loan.id,
            split.total(),
            ymd(2024, 2, 10),
            split,
            None,
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
        );
        payment.status = PaymentStatus::Verified;
        let payments = vec![payment];

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(40_000)],
            split_at(),
        )
        .unwrap();
        let mut outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        let second = outcome.record.resulting_loan_ids[1];
        let mut payment = outcome.relinked_payments[0].clone();
        reassign_payment_to_split(
            &outcome.record,
            &mut payment,
            &mut outcome.resulting_loans,
            second,
            split_at(),
            &mut EventStore::new(),
        )
        .unwrap();

        let target = &outcome.resulting_loans[1];
        assert_eq!(target.remaining_principal, Money::ZERO);
        assert_eq!(target.status, LoanStatus::Closed);
        assert!(target.closed_at.is_some());
    }

    #[test]
    fn test_reassign_rejects_non_member() {
        let (loan, payments) = loan_with_payment();

        let decision = split_loan(
            &loan,
            &payments,
            &[Money::from_major(60_000), Money::from_major(40_000)],
            split_at(),
        )
        .unwrap();
        let mut outcome = match decision {
            SplitDecision::Completed(outcome) => outcome,
            SplitDecision::Declined(reason) => panic!("declined: {reason}"),
        };

        let stranger = Uuid::new_v4();
        let mut payment = outcome.relinked_payments[0].clone();
        let result = reassign_payment_to_split(
            &outcome.record,
            &mut payment,
            &mut outcome.resulting_loans,
            stranger,
            split_at(),
            &mut EventStore::new(),
        );
        assert!(matches!(result, Err(LedgerError::NotASplitMember { .. })));
    }

    proptest! {
        // any valid allocation vector conserves principal and history
        #[test]
        fn prop_split_conservation(cuts in proptest::collection::vec(1i64..50_000, 1..6)) {
            let total: i64 = cuts.iter().sum();
            let loan = Loan::originate(
                LoanTerms::regular_daily(Money::from_major(total), Rate::from_percentage(12)),
                "cust-1",
                "prop loan",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )
            .unwrap();
            let pre_split = quote_for_loan(&loan, ymd(2024, 1, 31));

            let allocations: Vec<Money> = cuts.iter().map(|&c| Money::from_major(c)).collect();
            let decision = split_loan(&loan, &[], &allocations, split_at()).unwrap();
            let outcome = match decision {
                SplitDecision::Completed(outcome) => outcome,
                SplitDecision::Declined(reason) => panic!("declined: {reason}"),
            };

            let conserved: Money = outcome.resulting_loans.iter().map(|l| l.remaining_principal).sum();
            prop_assert_eq!(conserved, loan.remaining_principal);

            for resulting in &outcome.resulting_loans {
                prop_assert_eq!(quote_for_loan(resulting, ymd(2024, 1, 31)), pre_split);
            }
        }
    }
}
