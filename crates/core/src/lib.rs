//! Statement aggregation engine for Folio.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the traits in [`store`].
//!
//! # Modules
//!
//! - `chart` - Chart of accounts, semantic roles and classification tables
//! - `ledger` - Sign conventions and point-in-time balances
//! - `statement` - Balance sheet snapshots, lifecycle and comparison
//! - `store` - Persistence boundary
//! - `diagnostics` - Degradation warnings collected during generation

pub mod chart;
pub mod diagnostics;
pub mod ledger;
pub mod statement;
pub mod store;

pub use diagnostics::{CalculationWarning, WarningLog};
pub use statement::{StatementError, StatementService};
pub use store::{StatementRepository, StoreError, StoreResult};
