use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::interest::quote_for_loan;
use crate::loan::{Loan, Payment};
use crate::payments::{
    outstanding_interest, pending_interest, pending_principal, total_received, verified_interest,
    verified_principal,
};
use crate::types::{LoanId, LoanStatus};

/// most recent verified payment, for digest display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastPayment {
    pub payment_date: NaiveDate,
    pub amount: Money,
}

/// Read-only per-loan figures for reports and notification digests.
///
/// All amounts are at storage precision (2 dp). A closed loan reports zero
/// outstanding interest (closing is forward-looking only); the underlying
/// calculator still answers historical queries unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: LoanId,
    pub name: String,
    pub status: LoanStatus,
    pub as_of: NaiveDate,

    pub principal_amount: Money,
    pub remaining_principal: Money,
    pub interest_rate: Rate,
    pub elapsed_days: u32,

    /// accrued interest under the daily (360-day) convention
    pub accrued_daily: Money,
    /// accrued interest under the monthly (30-day step) convention
    pub accrued_monthly: Money,
    /// current per-day interest on the remaining principal
    pub daily_interest_amount: Money,
    /// current per-month interest on the remaining principal
    pub monthly_interest_amount: Money,

    pub interest_outstanding: Money,
    pub pending_interest: Money,
    pub pending_principal: Money,
    pub verified_interest: Money,
    pub verified_principal: Money,
    pub total_received: Money,
    pub last_verified_payment: Option<LastPayment>,
}

impl LoanSummary {
    pub fn compute(loan: &Loan, history: &[Payment], as_of: NaiveDate) -> Self {
        let quote = quote_for_loan(loan, as_of);

        let interest_outstanding = if loan.status == LoanStatus::Closed {
            Money::ZERO
        } else {
            outstanding_interest(loan, history, as_of)
        };

        let last_verified_payment = history
            .iter()
            .filter(|p| p.is_verified())
            .max_by_key(|p| (p.payment_date, p.submitted_at))
            .map(|p| LastPayment {
                payment_date: p.payment_date,
                amount: p.amount.stored(),
            });

        Self {
            loan_id: loan.id,
            name: loan.name.clone(),
            status: loan.status,
            as_of,
            principal_amount: loan.principal_amount.stored(),
            remaining_principal: loan.remaining_principal.stored(),
            interest_rate: loan.interest_rate,
            elapsed_days: quote.elapsed_days,
            accrued_daily: quote.daily_equivalent.stored(),
            accrued_monthly: quote.monthly_equivalent.stored(),
            daily_interest_amount: (loan.remaining_principal
                * loan.interest_rate.daily_rate().as_decimal())
            .stored(),
            monthly_interest_amount: (loan.remaining_principal
                * loan.interest_rate.monthly_rate().as_decimal())
            .stored(),
            interest_outstanding,
            pending_interest: pending_interest(history).stored(),
            pending_principal: pending_principal(history).stored(),
            verified_interest: verified_interest(history).stored(),
            verified_principal: verified_principal(history).stored(),
            total_received: total_received(history).stored(),
            last_verified_payment,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
