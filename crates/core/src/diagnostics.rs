//! Degradation warnings collected during one generation.
//!
//! Leaf-level failures never abort a statement. They are coerced to zero,
//! logged, and recorded here so they end up on the snapshot.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// A calculation that fell back to a default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationWarning {
    /// Component that degraded (e.g. `balance_aggregator`).
    pub component: String,
    /// Account involved, if any.
    pub account_code: Option<String>,
    /// Human-readable cause.
    pub reason: String,
}

/// Thread-safe sink for [`CalculationWarning`]s.
#[derive(Debug, Default)]
pub struct WarningLog {
    entries: Mutex<Vec<CalculationWarning>>,
}

impl WarningLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a structured warning event and keeps it for the snapshot.
    pub fn record(&self, component: &str, account_code: Option<&str>, reason: impl ToString) {
        let reason = reason.to_string();
        tracing::warn!(
            component,
            account_code = account_code.unwrap_or("-"),
            reason = %reason,
            "calculation degraded to zero"
        );

        let warning = CalculationWarning {
            component: component.to_string(),
            account_code: account_code.map(str::to_string),
            reason,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing degraded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the log, returning warnings in record order.
    #[must_use]
    pub fn into_entries(self) -> Vec<CalculationWarning> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
