pub mod cashback;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod lifecycle;
pub mod loan;
pub mod payments;
pub mod summary;
pub mod types;

// re-export key types
pub use cashback::{CashbackAward, CashbackKind, CashbackRule};
pub use config::LoanTerms;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use interest::{quote_for_loan, InterestQuote};
pub use ledger::{LoanLedger, Submission, VerificationOutcome};
pub use lifecycle::{
    close_loan, reassign_payment_to_split, split_loan, LoanSplit, SplitDecision, SplitOutcome,
};
pub use loan::{Loan, Payment, SplitOrigin};
pub use payments::{allocate_and_validate, outstanding_interest, PaymentRequest};
pub use summary::{LastPayment, LoanSummary};
pub use types::{
    AllocationDecision, DeclineReason, LoanId, LoanStatus, LoanType, PaymentFrequency, PaymentId,
    PaymentKind, PaymentSplit, PaymentStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
