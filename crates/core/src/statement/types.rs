//! Statement snapshot domain types.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{StatementId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::PeriodType;
use super::sections::{Assets, BalanceCheck, Equity, Liabilities};
use crate::diagnostics::CalculationWarning;

/// Lifecycle status of a statement snapshot.
///
/// Transitions are one-way:
/// - Draft → Review
/// - Review → Approved
/// - Approved → Final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStatus {
    /// Freshly generated; editable and deletable.
    Draft,
    /// Submitted for review.
    Review,
    /// Signed off.
    Approved,
    /// Closed for good.
    Final,
}

impl StatementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Final => "final",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "review" => Some(Self::Review),
            "approved" => Some(Self::Approved),
            "final" => Some(Self::Final),
            _ => None,
        }
    }

    /// Returns true if the snapshot may still be edited or deleted.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of event recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Snapshot generated.
    Created,
    /// Content or status changed.
    Updated,
    /// Approved or finalized.
    Approved,
    /// Sent back by a reviewer.
    Rejected,
    /// Exported outside the system.
    Exported,
    /// Opened by a user.
    Viewed,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Exported => "exported",
            Self::Viewed => "viewed",
        }
    }

    /// Parses an action from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "exported" => Some(Self::Exported),
            "viewed" => Some(Self::Viewed),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 1-based position in the trail, assigned by the store on append.
    pub sequence: u32,
    /// What happened.
    pub action: AuditAction,
    /// Who did it.
    pub performed_by: UserId,
    /// Free-text description.
    pub details: String,
    /// Structured diff, when the event changed content.
    pub changes: Option<serde_json::Value>,
    /// When it happened.
    pub performed_at: DateTime<Utc>,
}

/// Generation bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// User who requested generation.
    pub generated_by: UserId,
    /// When the snapshot was assembled.
    pub generated_at: DateTime<Utc>,
    /// Content version, bumped on every draft edit.
    pub version: u32,
}

/// A persisted, point-in-time balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSnapshot {
    /// Snapshot id.
    pub id: StatementId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Human-readable number, unique per tenant.
    pub statement_number: String,
    /// As-of cutoff.
    pub statement_date: DateTime<Utc>,
    /// Period length.
    pub period_type: PeriodType,
    /// First day of the period containing the cutoff.
    pub period_start: NaiveDate,
    /// Lifecycle status.
    pub status: StatementStatus,
    /// Asset side.
    pub assets: Assets,
    /// Liability side.
    pub liabilities: Liabilities,
    /// Equity side.
    pub equity: Equity,
    /// Accounting identity check.
    pub balance_check: BalanceCheck,
    /// Free-text notes, editable in draft.
    pub notes: Option<String>,
    /// Calculations that degraded to zero during generation.
    pub warnings: Vec<CalculationWarning>,
    /// Generation bookkeeping.
    pub metadata: StatementMetadata,
    /// Append-only audit trail, ordered by sequence.
    pub audit_trail: Vec<AuditEntry>,
}

impl StatementSnapshot {
    /// Recomputes all section totals.
    pub fn recalculate(&mut self) {
        self.assets.recalculate();
        self.liabilities.recalculate();
        self.equity.recalculate();
    }
}

/// Draft edit. `None` fields are left untouched; sections are replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementPatch {
    /// New notes. `Some("")` clears them.
    pub notes: Option<String>,
    /// Replacement asset section.
    pub assets: Option<Assets>,
    /// Replacement liability section.
    pub liabilities: Option<Liabilities>,
    /// Replacement equity section.
    pub equity: Option<Equity>,
}

impl StatementPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_none()
            && self.assets.is_none()
            && self.liabilities.is_none()
            && self.equity.is_none()
    }
}

/// Input for generating a new statement.
#[derive(Debug, Clone)]
pub struct GenerateStatementInput {
    /// Tenant to generate for.
    pub tenant_id: TenantId,
    /// As-of date, `YYYY-MM-DD` or RFC 3339.
    pub as_of: String,
    /// Period length.
    pub period_type: PeriodType,
    /// Requesting user.
    pub requested_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_strings() {
        for status in [
            StatementStatus::Draft,
            StatementStatus::Review,
            StatementStatus::Approved,
            StatementStatus::Final,
        ] {
            assert_eq!(StatementStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StatementStatus::parse("posted"), None);
    }

    #[test]
    fn test_only_draft_is_editable() {
        assert!(StatementStatus::Draft.is_editable());
        assert!(!StatementStatus::Review.is_editable());
        assert!(!StatementStatus::Final.is_editable());
    }

    #[test]
    fn test_audit_action_parse() {
        assert_eq!(AuditAction::parse("Exported"), Some(AuditAction::Exported));
        assert_eq!(AuditAction::parse("deleted"), None);
        assert_eq!(AuditAction::Viewed.to_string(), "viewed");
    }

    #[test]
    fn test_empty_patch() {
        assert!(StatementPatch::default().is_empty());
        let patch = StatementPatch {
            notes: Some("year-end adjustments pending".to_string()),
            ..StatementPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
