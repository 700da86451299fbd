use chrono::NaiveDate;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Loan, Payment};
use crate::payments::outstanding_interest;
use crate::types::{AllocationDecision, DeclineReason, LoanType, PaymentSplit};

/// Decide how a tendered amount divides between interest and principal, and
/// whether the submission is acceptable at all.
///
/// Reads the loan snapshot and its payment history, mutates nothing. A
/// rejected submission is a normal outcome and comes back as
/// [`AllocationDecision::Declined`] with a machine-readable reason; an `Err`
/// from this function means the allocator itself produced an inconsistent
/// split and the operation must be aborted.
///
/// The caller must serialize calls per loan (one in-flight mutating operation
/// at a time), otherwise two concurrent submissions can both pass the
/// outstanding-interest ceiling.
pub fn allocate_and_validate(
    loan: &Loan,
    history: &[Payment],
    amount: Money,
    payment_date: NaiveDate,
) -> Result<AllocationDecision> {
    let amount = amount.stored();

    if !amount.is_positive() {
        tracing::debug!(loan_id = %loan.id, %amount, "declined: non-positive amount");
        return Ok(AllocationDecision::Declined(DeclineReason::InvalidAmount));
    }

    if payment_date < loan.created_on() {
        tracing::debug!(loan_id = %loan.id, %payment_date, "declined: predates loan");
        return Ok(AllocationDecision::Declined(DeclineReason::PredatesLoan));
    }
    let interest_due = outstanding_interest(loan, history, payment_date);

    let split = match loan.loan_type {
        LoanType::InterestOnly => {
            // ordinary payments never touch principal; anything beyond the
            // outstanding interest has nowhere to go
            if amount > interest_due {
                tracing::debug!(
                    loan_id = %loan.id,
                    %amount,
                    %interest_due,
                    "declined: exceeds outstanding interest"
                );
                return Ok(AllocationDecision::Declined(DeclineReason::ExceedsOutstandingInterest));
            }
            PaymentSplit::interest_only(amount)
        }
        LoanType::Regular => {
            // interest is satisfied first, capped at what is actually owed;
            // the remainder reduces principal on verification
            if amount >= interest_due {
                PaymentSplit::with_principal(interest_due, amount - interest_due)
            } else {
                PaymentSplit::interest_only(amount)
            }
        }
    };

    if split.total() != amount {
        tracing::error!(
            loan_id = %loan.id,
            %amount,
            interest = %split.interest_amount,
            principal = %split.principal_amount,
            %payment_date,
            "allocator produced split that does not sum to amount"
        );
        return Err(LedgerError::SplitSumMismatch {
            amount,
            interest: split.interest_amount,
            principal: split.principal_amount,
        });
    }

    tracing::debug!(
        loan_id = %loan.id,
        %amount,
        interest = %split.interest_amount,
        principal = %split.principal_amount,
        "payment accepted"
    );
    Ok(AllocationDecision::Accepted(split))
}
