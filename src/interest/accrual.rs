use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::interest::InterestQuote;
use crate::loan::Loan;

/// days in the accrual year for the daily convention
const YEAR_BASIS: u32 = 360;

/// days per accrual step for the monthly convention
const DAYS_PER_MONTH: u32 = 30;

/// whole days between two dates, clamped to zero when `to` precedes `from`
pub fn elapsed_days(from: NaiveDate, to: NaiveDate) -> u32 {
    (to - from).num_days().max(0) as u32
}

/// complete 30-day accrual periods in an elapsed span
pub fn complete_months(days: u32) -> u32 {
    days / DAYS_PER_MONTH
}

/// simple interest on the 360-day year: principal x rate / 360 x days
pub fn daily_interest(principal: Money, annual_rate: Rate, days: u32) -> Money {
    let interest =
        principal.as_decimal() * annual_rate.as_decimal() * Decimal::from(days) / Decimal::from(YEAR_BASIS);
    Money::from_decimal(interest)
}

/// Step-function interest: principal x rate / 12 per complete 30-day period.
///
/// Nothing accrues before the first full period; partial months beyond the
/// last 30-day boundary contribute nothing.
pub fn monthly_interest(principal: Money, annual_rate: Rate, days: u32) -> Money {
    let months = complete_months(days);
    let interest =
        principal.as_decimal() * annual_rate.as_decimal() * Decimal::from(months) / Decimal::from(12_u32);
    Money::from_decimal(interest)
}

/// both convention figures for an explicit principal/anchor pair
pub fn quote(principal: Money, annual_rate: Rate, anchor: NaiveDate, as_of: NaiveDate) -> InterestQuote {
    let days = elapsed_days(anchor, as_of);
    InterestQuote {
        daily_equivalent: daily_interest(principal, annual_rate, days),
        monthly_equivalent: monthly_interest(principal, annual_rate, days),
        elapsed_days: days,
    }
}

/// Gross accrued interest for a loan as of a date.
///
/// Pure in the loan snapshot and the date: no clock reads, identical inputs
/// give identical results. The anchor is the loan's creation date; for a loan
/// produced by a split, dates on or before the split answer from the recorded
/// pre-split principal and original anchor, and later dates accrue on the
/// loan's own principal from the split date forward.
pub fn quote_for_loan(loan: &Loan, as_of: NaiveDate) -> InterestQuote {
    match &loan.split_origin {
        Some(origin) if as_of <= origin.split_on => {
            quote(origin.pre_split_principal, loan.interest_rate, origin.original_created_on, as_of)
        }
        Some(origin) => quote(loan.remaining_principal, loan.interest_rate, origin.split_on, as_of),
        None => quote(loan.remaining_principal, loan.interest_rate, loan.created_on(), as_of),
    }
}
