//! Period-over-period comparison of top-level totals.

use chrono::{DateTime, Duration, Months, Utc};
use folio_shared::types::StatementId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::StatementSnapshot;

/// Which earlier snapshot to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKind {
    /// Latest snapshot of the same period type strictly before the current one.
    Previous,
    /// Snapshot of the same period type dated one year earlier.
    YearAgo,
}

impl BaselineKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Previous => "previous",
            Self::YearAgo => "year_ago",
        }
    }

    /// Parses a baseline kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "previous" => Some(Self::Previous),
            "year_ago" => Some(Self::YearAgo),
            _ => None,
        }
    }
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delta of one total between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComparison {
    /// Current value.
    pub current: Decimal,
    /// Baseline value.
    pub previous: Decimal,
    /// current - previous.
    pub change: Decimal,
    /// change / previous * 100 when previous > 0, else 0.
    pub percentage_change: Decimal,
}

impl LineComparison {
    /// Compares two values.
    #[must_use]
    pub fn between(current: Decimal, previous: Decimal) -> Self {
        let change = current - previous;
        let percentage_change = if previous > Decimal::ZERO {
            change
                .checked_div(previous)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        Self {
            current,
            previous,
            change,
            percentage_change,
        }
    }
}

/// Result of comparing a snapshot against its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Snapshot being compared.
    pub current_id: StatementId,
    /// Its number.
    pub current_number: String,
    /// Baseline snapshot.
    pub baseline_id: StatementId,
    /// Its number.
    pub baseline_number: String,
    /// How the baseline was chosen.
    pub baseline_kind: BaselineKind,
    /// Baseline as-of date.
    pub baseline_date: DateTime<Utc>,
    /// Total assets.
    pub assets: LineComparison,
    /// Total liabilities.
    pub liabilities: LineComparison,
    /// Total equity.
    pub equity: LineComparison,
}

impl ComparisonResult {
    /// Compares `current` against `baseline`.
    #[must_use]
    pub fn between(
        current: &StatementSnapshot,
        baseline: &StatementSnapshot,
        baseline_kind: BaselineKind,
    ) -> Self {
        Self {
            current_id: current.id,
            current_number: current.statement_number.clone(),
            baseline_id: baseline.id,
            baseline_number: baseline.statement_number.clone(),
            baseline_kind,
            baseline_date: baseline.statement_date,
            assets: LineComparison::between(
                current.assets.total_assets,
                baseline.assets.total_assets,
            ),
            liabilities: LineComparison::between(
                current.liabilities.total_liabilities,
                baseline.liabilities.total_liabilities,
            ),
            equity: LineComparison::between(
                current.equity.total_equity,
                baseline.equity.total_equity,
            ),
        }
    }
}

/// Search window `(target, from, to)` for the year-ago baseline.
#[must_use]
pub fn year_ago_window(
    date: DateTime<Utc>,
    window_days: i64,
) -> Option<(DateTime<Utc>, DateTime<Utc>, DateTime<Utc>)> {
    let target = date.checked_sub_months(Months::new(12))?;
    let window = Duration::try_days(window_days.max(0))?;
    Some((
        target,
        target.checked_sub_signed(window)?,
        target.checked_add_signed(window)?,
    ))
}

/// The candidate dated closest to `target`; earlier wins ties.
#[must_use]
pub fn closest_to(
    target: DateTime<Utc>,
    candidates: Vec<StatementSnapshot>,
) -> Option<StatementSnapshot> {
    candidates
        .into_iter()
        .min_by_key(|s| ((s.statement_date - target).abs(), s.statement_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::test_support::fixtures;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_change() {
        let line = LineComparison::between(dec!(1500), dec!(1000));
        assert_eq!(line.change, dec!(500));
        assert_eq!(line.percentage_change, dec!(50));

        let line = LineComparison::between(dec!(750), dec!(1000));
        assert_eq!(line.change, dec!(-250));
        assert_eq!(line.percentage_change, dec!(-25));
    }

    #[test]
    fn test_zero_or_negative_baseline_has_no_percentage() {
        assert_eq!(
            LineComparison::between(dec!(1500), dec!(0)).percentage_change,
            Decimal::ZERO
        );
        assert_eq!(
            LineComparison::between(dec!(100), dec!(-50)).percentage_change,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_year_ago_window() {
        let date = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        let (target, from, to) = year_ago_window(date, 1).unwrap();
        assert_eq!(target, Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap());
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 3, 30, 23, 59, 59).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2024, 4, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_year_ago_window_leap_day() {
        let date = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let (target, _, _) = year_ago_window(date, 1).unwrap();
        assert_eq!(target, Utc.with_ymd_and_hms(2023, 2, 28, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_closest_candidate() {
        let tenant = fixtures::tenant();
        let target = Utc.with_ymd_and_hms(2024, 3, 31, 18, 0, 0).unwrap();
        let early = fixtures::snapshot(tenant, "A", NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        let exact = fixtures::snapshot(tenant, "B", NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

        let found = closest_to(target, vec![early, exact]).unwrap();
        assert_eq!(found.statement_number, "B");
        assert!(closest_to(target, Vec::new()).is_none());
    }

    #[test]
    fn test_baseline_kind_parse() {
        assert_eq!(BaselineKind::parse("year-ago"), Some(BaselineKind::YearAgo));
        assert_eq!(BaselineKind::parse("Previous"), Some(BaselineKind::Previous));
        assert_eq!(BaselineKind::parse("quarter"), None);
    }

    fn amount() -> impl Strategy<Value = Decimal> {
        (-100_000_000i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        /// change == current - previous, and percentage is zero without a positive base.
        #[test]
        fn prop_comparison_law(current in amount(), previous in amount()) {
            let line = LineComparison::between(current, previous);
            prop_assert_eq!(line.change, current - previous);
            if previous <= Decimal::ZERO {
                prop_assert_eq!(line.percentage_change, Decimal::ZERO);
            } else {
                prop_assert_eq!(line.percentage_change.is_zero(), line.change.is_zero());
                prop_assert_eq!(
                    line.percentage_change < Decimal::ZERO,
                    line.change < Decimal::ZERO
                );
            }
        }
    }
}
