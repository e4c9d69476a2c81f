//! Statement status transitions.

use folio_shared::types::UserId;

use super::audit::AuditRecorder;
use super::error::StatementError;
use super::types::{AuditAction, AuditEntry, StatementStatus};

/// Stateless status machine for statement snapshots.
///
/// Valid transitions:
/// - Draft → Review
/// - Review → Approved
/// - Approved → Final
pub struct StatementWorkflow;

impl StatementWorkflow {
    /// Returns true if `from` → `to` is allowed.
    #[must_use]
    pub fn is_valid_transition(from: StatementStatus, to: StatementStatus) -> bool {
        matches!(
            (from, to),
            (StatementStatus::Draft, StatementStatus::Review)
                | (StatementStatus::Review, StatementStatus::Approved)
                | (StatementStatus::Approved, StatementStatus::Final)
        )
    }

    /// Validates a transition and builds its audit entry.
    pub fn transition(
        from: StatementStatus,
        to: StatementStatus,
        performed_by: UserId,
    ) -> Result<AuditEntry, StatementError> {
        if !Self::is_valid_transition(from, to) {
            return Err(StatementError::InvalidTransition { from, to });
        }

        let (action, details) = match to {
            StatementStatus::Review => (AuditAction::Updated, "Submitted for review".to_string()),
            StatementStatus::Approved => (AuditAction::Approved, "Statement approved".to_string()),
            StatementStatus::Final => (AuditAction::Approved, "Statement finalized".to_string()),
            StatementStatus::Draft => (AuditAction::Updated, format!("Status changed to {to}")),
        };

        Ok(AuditRecorder::entry(
            action,
            performed_by,
            details,
            Some(serde_json::json!({ "status": { "from": from, "to": to } })),
        ))
    }
}
