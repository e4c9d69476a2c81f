//! Reporting periods and as-of date parsing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::StatementError;

/// Length of the period a statement closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Calendar month.
    Monthly,
    /// Calendar quarter.
    Quarterly,
    /// Calendar year.
    Yearly,
}

impl PeriodType {
    /// Returns the string representation of the period type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses a period type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// First day of the period containing `date`.
    #[must_use]
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            Self::Monthly => date.month(),
            Self::Quarterly => (date.month0() / 3) * 3 + 1,
            Self::Yearly => 1,
        };
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
    }

    /// Last day of the period containing `date`.
    #[must_use]
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        let start = self.period_start(date);
        let months = match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        };
        start
            .checked_add_months(chrono::Months::new(months))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date)
    }

    /// Period code embedded in statement numbers: `202503`, `2025Q1` or `2025`.
    #[must_use]
    pub fn number_code(self, date: NaiveDate) -> String {
        match self {
            Self::Monthly => format!("{}{:02}", date.year(), date.month()),
            Self::Quarterly => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
            Self::Yearly => date.year().to_string(),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an as-of date into a cutoff instant.
///
/// `YYYY-MM-DD` means the end of that day in UTC, so the whole day's activity
/// is included. RFC 3339 timestamps are taken literally.
pub fn parse_as_of(input: &str) -> Result<DateTime<Utc>, StatementError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(end_of_day(date));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StatementError::InvalidDate(input.to_string()))
}

/// Last representable microsecond of `date` in UTC.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(PeriodType::Monthly, date(2025, 3, 17), date(2025, 3, 1), date(2025, 3, 31))]
    #[case(PeriodType::Monthly, date(2024, 2, 10), date(2024, 2, 1), date(2024, 2, 29))]
    #[case(PeriodType::Quarterly, date(2025, 5, 2), date(2025, 4, 1), date(2025, 6, 30))]
    #[case(PeriodType::Quarterly, date(2025, 12, 31), date(2025, 10, 1), date(2025, 12, 31))]
    #[case(PeriodType::Yearly, date(2025, 7, 4), date(2025, 1, 1), date(2025, 12, 31))]
    fn test_period_bounds(
        #[case] period_type: PeriodType,
        #[case] as_of: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        assert_eq!(period_type.period_start(as_of), start);
        assert_eq!(period_type.period_end(as_of), end);
    }

    #[rstest]
    #[case(PeriodType::Monthly, "202503")]
    #[case(PeriodType::Quarterly, "2025Q1")]
    #[case(PeriodType::Yearly, "2025")]
    fn test_number_code(#[case] period_type: PeriodType, #[case] expected: &str) {
        assert_eq!(period_type.number_code(date(2025, 3, 31)), expected);
    }

    #[test]
    fn test_parse_plain_date_is_end_of_day() {
        let cutoff = parse_as_of("2025-03-31").unwrap();
        assert_eq!(cutoff.date_naive(), date(2025, 3, 31));
        assert_eq!(cutoff.hour(), 23);
        assert_eq!(cutoff.minute(), 59);
    }

    #[test]
    fn test_parse_rfc3339() {
        let cutoff = parse_as_of("2025-03-31T10:00:00+02:00").unwrap();
        assert_eq!(cutoff.hour(), 8);
    }

    #[rstest]
    #[case("")]
    #[case("31/03/2025")]
    #[case("2025-02-30")]
    #[case("yesterday")]
    fn test_parse_rejects_garbage(#[case] input: &str) {
        assert!(matches!(parse_as_of(input), Err(StatementError::InvalidDate(_))));
    }

    #[test]
    fn test_period_type_parse() {
        assert_eq!(PeriodType::parse("Quarterly"), Some(PeriodType::Quarterly));
        assert_eq!(PeriodType::parse("weekly"), None);
    }
}
