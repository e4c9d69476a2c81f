//! Statement numbering.
//!
//! Numbers look like `BS-202503-0001`: configured prefix, period code, then a
//! zero-padded sequence. Allocation is best-effort; the storage-level unique
//! constraint on the number is the final arbiter.

use chrono::NaiveDate;
use folio_shared::NumberingSettings;
use folio_shared::types::TenantId;

use super::error::StatementError;
use super::period::PeriodType;
use crate::store::SnapshotStore;

/// Number prefix shared by every statement of one period, e.g. `BS-2025Q1-`.
#[must_use]
pub fn number_prefix(settings: &NumberingSettings, period_type: PeriodType, date: NaiveDate) -> String {
    format!("{}-{}-", settings.prefix, period_type.number_code(date))
}

/// Formats a full statement number.
#[must_use]
pub fn format_number(prefix: &str, sequence: u32, width: usize) -> String {
    format!("{prefix}{sequence:0width$}")
}

/// Extracts the sequence from a number carrying `prefix`.
#[must_use]
pub fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    number.strip_prefix(prefix)?.parse().ok()
}

/// Proposes the next free number for the period.
///
/// Scans existing numbers with the prefix, proposes max + 1, then probes
/// upward while the candidate is taken.
pub(crate) async fn reserve<S: SnapshotStore>(
    store: &S,
    tenant_id: TenantId,
    settings: &NumberingSettings,
    period_type: PeriodType,
    date: NaiveDate,
) -> Result<String, StatementError> {
    let prefix = number_prefix(settings, period_type, date);
    let existing = store.find_numbers_with_prefix(tenant_id, &prefix).await?;
    let mut candidate = existing
        .iter()
        .filter_map(|n| parse_sequence(n, &prefix))
        .max()
        .unwrap_or(0)
        .saturating_add(1);

    for _ in 0..settings.max_attempts {
        let number = format_number(&prefix, candidate, settings.sequence_width);
        if store.find_by_number(tenant_id, &number).await?.is_none() {
            return Ok(number);
        }
        tracing::debug!(%tenant_id, statement_number = %number, "statement number taken, probing next");
        candidate = candidate.saturating_add(1);
    }

    Err(StatementError::NumberAllocation {
        prefix,
        attempts: settings.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::test_support::{MemoryStore, fixtures};
    use rstest::rstest;

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    #[rstest]
    #[case(PeriodType::Monthly, "BS-202503-")]
    #[case(PeriodType::Quarterly, "BS-2025Q1-")]
    #[case(PeriodType::Yearly, "BS-2025-")]
    fn test_prefix(#[case] period_type: PeriodType, #[case] expected: &str) {
        assert_eq!(
            number_prefix(&NumberingSettings::default(), period_type, march()),
            expected
        );
    }

    #[test]
    fn test_format_and_parse() {
        assert_eq!(format_number("BS-202503-", 7, 4), "BS-202503-0007");
        assert_eq!(format_number("BS-202503-", 12345, 4), "BS-202503-12345");
        assert_eq!(parse_sequence("BS-202503-0042", "BS-202503-"), Some(42));
        assert_eq!(parse_sequence("BS-202503-draft", "BS-202503-"), None);
        assert_eq!(parse_sequence("BS-202504-0042", "BS-202503-"), None);
    }

    #[tokio::test]
    async fn test_first_number_of_period() {
        let store = MemoryStore::new();
        let number = reserve(
            &store,
            fixtures::tenant(),
            &NumberingSettings::default(),
            PeriodType::Monthly,
            march(),
        )
        .await
        .unwrap();
        assert_eq!(number, "BS-202503-0001");
    }

    #[tokio::test]
    async fn test_next_after_max_existing() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0001", march()));
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0004", march()));
        store.insert_raw(fixtures::snapshot(fixtures::tenant(), "BS-202503-0009", march()));

        let number = reserve(
            &store,
            tenant,
            &NumberingSettings::default(),
            PeriodType::Monthly,
            march(),
        )
        .await
        .unwrap();
        assert_eq!(number, "BS-202503-0005");
    }

    #[tokio::test]
    async fn test_probes_past_hidden_collisions() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0001", march()));
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0002", march()));
        // Prefix scans miss these, as with a lagging replica.
        store.hide_from_prefix_scan();

        let number = reserve(
            &store,
            tenant,
            &NumberingSettings::default(),
            PeriodType::Monthly,
            march(),
        )
        .await
        .unwrap();
        assert_eq!(number, "BS-202503-0003");
    }

    #[tokio::test]
    async fn test_allocation_gives_up_after_max_attempts() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant();
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0001", march()));
        store.insert_raw(fixtures::snapshot(tenant, "BS-202503-0002", march()));
        store.hide_from_prefix_scan();

        let settings = NumberingSettings {
            max_attempts: 2,
            ..NumberingSettings::default()
        };
        let err = reserve(&store, tenant, &settings, PeriodType::Monthly, march())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StatementError::NumberAllocation { attempts: 2, .. }
        ));
    }
}
