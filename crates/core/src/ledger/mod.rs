//! Ledger sign conventions and point-in-time balances.
//!
//! Balances are never stored; they are derived from the opening balance and
//! completed ledger activity up to a cutoff.

pub mod aggregator;
pub mod balance;
pub mod types;

pub use aggregator::BalanceAggregator;
pub use balance::{AccountBalance, interval_activity};
pub use types::{DebitCreditTotals, LedgerStatus, NormalBalance};
