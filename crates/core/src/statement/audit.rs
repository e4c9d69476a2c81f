//! Audit trail entries.

use chrono::Utc;
use folio_shared::types::UserId;
use serde_json::{Map, Value, json};

use super::error::StatementError;
use super::types::{AuditAction, AuditEntry, StatementSnapshot};

/// Builds audit entries. Sequence numbers are assigned on append.
pub struct AuditRecorder;

impl AuditRecorder {
    /// A new entry stamped now.
    #[must_use]
    pub fn entry(
        action: AuditAction,
        performed_by: UserId,
        details: impl Into<String>,
        changes: Option<Value>,
    ) -> AuditEntry {
        AuditEntry {
            sequence: 0,
            action,
            performed_by,
            details: details.into(),
            changes,
            performed_at: Utc::now(),
        }
    }

    /// The entry recorded when a snapshot is generated.
    #[must_use]
    pub fn created(performed_by: UserId, snapshot: &StatementSnapshot) -> AuditEntry {
        Self::entry(
            AuditAction::Created,
            performed_by,
            format!(
                "Generated {} statement as of {}",
                snapshot.period_type,
                snapshot.statement_date.date_naive()
            ),
            Some(json!({
                "total_assets": snapshot.assets.total_assets,
                "total_liabilities": snapshot.liabilities.total_liabilities,
                "total_equity": snapshot.equity.total_equity,
                "warnings": snapshot.warnings.len(),
            })),
        )
    }

    /// An explicit annotation. `created` is reserved for generation.
    pub fn annotation(
        action: AuditAction,
        performed_by: UserId,
        details: impl Into<String>,
        changes: Option<Value>,
    ) -> Result<AuditEntry, StatementError> {
        if action == AuditAction::Created {
            return Err(StatementError::InvalidAuditAction(action));
        }
        Ok(Self::entry(action, performed_by, details, changes))
    }

    /// Appends `entry` to an in-memory trail, assigning the next sequence.
    pub fn append(trail: &mut Vec<AuditEntry>, mut entry: AuditEntry) {
        entry.sequence = next_sequence(trail);
        trail.push(entry);
    }

    /// Diff of the top-level totals and notes; `None` when nothing changed.
    #[must_use]
    pub fn changes(before: &StatementSnapshot, after: &StatementSnapshot) -> Option<Value> {
        let mut diff = Map::new();
        let mut field = |name: &str, from: Value, to: Value| {
            if from != to {
                diff.insert(name.to_string(), json!({ "from": from, "to": to }));
            }
        };

        field(
            "total_assets",
            json!(before.assets.total_assets),
            json!(after.assets.total_assets),
        );
        field(
            "total_liabilities",
            json!(before.liabilities.total_liabilities),
            json!(after.liabilities.total_liabilities),
        );
        field(
            "total_equity",
            json!(before.equity.total_equity),
            json!(after.equity.total_equity),
        );
        field("notes", json!(before.notes), json!(after.notes));
        field(
            "version",
            json!(before.metadata.version),
            json!(after.metadata.version),
        );

        (!diff.is_empty()).then_some(Value::Object(diff))
    }
}

fn next_sequence(trail: &[AuditEntry]) -> u32 {
    trail.iter().map(|e| e.sequence).max().unwrap_or(0) + 1
}
