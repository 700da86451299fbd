use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Payment;
use crate::types::{LoanId, PaymentId};

/// how a cashback rule computes points for a payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CashbackKind {
    /// points as a fraction of the payment's interest portion
    Percentage(Rate),
    /// flat points per qualifying payment
    Fixed(Money),
}

/// a standing cashback arrangement on a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackRule {
    pub recipient: String,
    pub kind: CashbackKind,
    pub active: bool,
}

impl CashbackRule {
    pub fn percentage(recipient: impl Into<String>, rate: Rate) -> Self {
        Self {
            recipient: recipient.into(),
            kind: CashbackKind::Percentage(rate),
            active: true,
        }
    }

    pub fn fixed(recipient: impl Into<String>, points: Money) -> Self {
        Self {
            recipient: recipient.into(),
            kind: CashbackKind::Fixed(points),
            active: true,
        }
    }
}

/// points granted to a recipient for one verified payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackAward {
    pub loan_id: LoanId,
    pub payment_id: PaymentId,
    pub recipient: String,
    pub points: Money,
}

/// Compute the awards a verified payment earns under the loan's active rules.
///
/// Pending and rejected payments never earn points; zero awards are dropped.
/// The award bookkeeping (ledger rows, redemptions) belongs to the caller.
pub fn awards_for_payment(rules: &[CashbackRule], payment: &Payment) -> Vec<CashbackAward> {
    if !payment.is_verified() {
        return Vec::new();
    }

    rules
        .iter()
        .filter(|rule| rule.active)
        .filter_map(|rule| {
            let points = match rule.kind {
                CashbackKind::Percentage(rate) => {
                    (payment.interest_amount * rate.as_decimal()).stored()
                }
                CashbackKind::Fixed(points) => points.stored(),
            };
            points.is_positive().then(|| CashbackAward {
                loan_id: payment.loan_id,
                payment_id: payment.id,
                recipient: rule.recipient.clone(),
                points,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentSplit, PaymentStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn verified_payment(interest: Money) -> Payment {
        let mut payment = Payment::new_pending(
            Uuid::new_v4(),
            interest,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            PaymentSplit::interest_only(interest),
            None,
            Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap(),
        );
        payment.status = PaymentStatus::Verified;
        payment
    }

    #[test]
    fn test_percentage_award() {
        let rules = vec![CashbackRule::percentage("alice", Rate::from_percentage(2))];
        let payment = verified_payment(Money::from_major(1000));

        let awards = awards_for_payment(&rules, &payment);
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].points, Money::from_major(20));
        assert_eq!(awards[0].recipient, "alice");
    }

    #[test]
    fn test_fixed_and_inactive_rules() {
        let mut inactive = CashbackRule::fixed("bob", Money::from_major(10));
        inactive.active = false;
        let rules = vec![inactive, CashbackRule::fixed("carol", Money::from_major(5))];
        let payment = verified_payment(Money::from_major(100));

        let awards = awards_for_payment(&rules, &payment);
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].recipient, "carol");
        assert_eq!(awards[0].points, Money::from_major(5));
    }

    #[test]
    fn test_pending_payment_earns_nothing() {
        let rules = vec![CashbackRule::percentage("alice", Rate::from_percentage(2))];
        let mut payment = verified_payment(Money::from_major(1000));
        payment.status = PaymentStatus::Pending;

        assert!(awards_for_payment(&rules, &payment).is_empty());
    }

    #[test]
    fn test_zero_award_dropped() {
        let rules = vec![CashbackRule::percentage("alice", Rate::ZERO)];
        let payment = verified_payment(Money::from_major(1000));

        assert!(awards_for_payment(&rules, &payment).is_empty());
    }
}
