//! Statement engine error types.

use chrono::NaiveDate;
use folio_shared::AppError;
use folio_shared::types::StatementId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::period::PeriodType;
use super::types::{AuditAction, StatementStatus};
use crate::store::StoreError;

/// Errors that can occur in statement operations.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Request carried no usable tenant id.
    #[error("Tenant id is required")]
    MissingTenant,

    /// As-of date could not be parsed.
    #[error("Invalid as-of date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),

    /// A statement already exists for the period.
    #[error("A {period_type} statement already exists for the period starting {period_start}")]
    DuplicatePeriod {
        /// Period type.
        period_type: PeriodType,
        /// First day of the period.
        period_start: NaiveDate,
    },

    /// Snapshot not found for this tenant.
    #[error("Statement {0} not found")]
    NotFound(StatementId),

    /// Edit or delete of a non-draft snapshot.
    #[error("Statement is {status} and can no longer be modified")]
    ImmutableState {
        /// Current status.
        status: StatementStatus,
    },

    /// Status transition not allowed.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: StatementStatus,
        /// Requested status.
        to: StatementStatus,
    },

    /// Another writer changed the snapshot between read and write.
    #[error("Statement {0} was modified concurrently; reload and retry")]
    ConcurrentModification(StatementId),

    /// No free statement number within the probe budget.
    #[error("Could not allocate a statement number with prefix {prefix} after {attempts} attempts")]
    NumberAllocation {
        /// Number prefix, including the period code.
        prefix: String,
        /// Attempts made.
        attempts: u32,
    },

    /// Audit action reserved for the engine.
    #[error("Audit action '{0}' cannot be appended explicitly")]
    InvalidAuditAction(AuditAction),

    /// Accounting identity violated while balancing is enforced.
    #[error("Balance sheet does not balance: assets differ from liabilities plus equity by {difference}")]
    Unbalanced {
        /// total_assets - (liabilities + equity).
        difference: Decimal,
    },

    /// A top-level category could not be computed.
    #[error("Statement aggregation failed: {0}")]
    Aggregation(String),

    /// Persistence failure.
    #[error("Statement store error: {0}")]
    Store(String),
}

impl StatementError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingTenant => 401,
            Self::InvalidDate(_) | Self::InvalidAuditAction(_) => 400,
            Self::NotFound(_) => 404,
            Self::DuplicatePeriod { .. } | Self::ConcurrentModification(_) => 409,
            Self::ImmutableState { .. } | Self::InvalidTransition { .. } | Self::Unbalanced { .. } => {
                422
            }
            Self::NumberAllocation { .. } | Self::Aggregation(_) | Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTenant => "MISSING_TENANT",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::DuplicatePeriod { .. } => "DUPLICATE_PERIOD",
            Self::NotFound(_) => "STATEMENT_NOT_FOUND",
            Self::ImmutableState { .. } => "IMMUTABLE_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::NumberAllocation { .. } => "NUMBER_ALLOCATION_FAILED",
            Self::InvalidAuditAction(_) => "INVALID_AUDIT_ACTION",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::Aggregation(_) => "AGGREGATION_FAILED",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<StoreError> for StatementError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<StatementError> for AppError {
    fn from(err: StatementError) -> Self {
        let message = err.to_string();
        match err {
            StatementError::MissingTenant => Self::TenantRequired(message),
            StatementError::InvalidDate(_) | StatementError::InvalidAuditAction(_) => {
                Self::Validation(message)
            }
            StatementError::NotFound(_) => Self::NotFound(message),
            StatementError::DuplicatePeriod { .. } | StatementError::ConcurrentModification(_) => {
                Self::Conflict(message)
            }
            StatementError::ImmutableState { .. }
            | StatementError::InvalidTransition { .. }
            | StatementError::Unbalanced { .. } => Self::BusinessRule(message),
            StatementError::Store(_) => Self::Database(message),
            StatementError::NumberAllocation { .. } | StatementError::Aggregation(_) => {
                Self::Internal(message)
            }
        }
    }
}
