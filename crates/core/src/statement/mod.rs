//! Balance sheet snapshots.
//!
//! A snapshot is assembled from the chart of accounts and the ledger as of a
//! cutoff, persisted as a draft, and then moves through
//! Draft → Review → Approved → Final. Everything after draft is immutable
//! except the audit trail.

pub mod assets;
pub mod audit;
pub mod comparison;
pub(crate) mod context;
pub mod equity;
pub mod error;
pub mod income;
pub mod liabilities;
pub mod numbering;
pub mod period;
pub mod retained;
pub mod sections;
pub mod service;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::AuditRecorder;
pub use comparison::{BaselineKind, ComparisonResult, LineComparison};
pub use error::StatementError;
pub use income::IncomeSummary;
pub use period::{PeriodType, parse_as_of};
pub use sections::{
    AccruedExpenses, Assets, BalanceCheck, CashAndEquivalents, ContributedCapital,
    CurrentAssets, CurrentLiabilities, EarningsSource, Equity, FixedAssets, IntangibleAssets,
    Inventory, Liabilities, LongTermDebt, LongTermLiabilities, OtherEquity, Receivables,
    RetainedEarnings, ShortTermDebt,
};
pub use service::{StatementService, ensure_tenant};
pub use types::{
    AuditAction, AuditEntry, GenerateStatementInput, StatementMetadata, StatementPatch,
    StatementSnapshot, StatementStatus,
};
pub use workflow::StatementWorkflow;
