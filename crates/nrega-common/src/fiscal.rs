use chrono::{DateTime, Datelike, Utc};
use std::fmt;
use std::str::FromStr;

/// An Indian fiscal year, labelled the way MGNREGA data is partitioned:
/// `"2024-2025"` runs from 1 April 2024 to 31 March 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinYear {
    start: i32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid fiscal year label '{0}', expected e.g. '2024-2025'")]
pub struct FinYearParseError(pub String);

impl FinYear {
    pub fn new(start: i32) -> Self {
        Self { start }
    }

    /// The fiscal year containing the given instant (April-to-March).
    pub fn containing(at: DateTime<Utc>) -> Self {
        let start = if at.month() >= 4 {
            at.year()
        } else {
            at.year() - 1
        };
        Self { start }
    }

    pub fn start_year(&self) -> i32 {
        self.start
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FinYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.start + 1)
    }
}

impl FromStr for FinYear {
    type Err = FinYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FinYearParseError(s.to_string());
        let (a, b) = s.split_once('-').ok_or_else(err)?;
        let start: i32 = a.trim().parse().map_err(|_| err())?;
        let end: i32 = b.trim().parse().map_err(|_| err())?;
        if end != start + 1 || !(1900..=9999).contains(&start) {
            return Err(err());
        }
        Ok(Self { start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn label_round_trips() {
        let fy: FinYear = "2024-2025".parse().expect("label should parse");
        assert_eq!(fy.start_year(), 2024);
        assert_eq!(fy.label(), "2024-2025");
    }

    #[test]
    fn rejects_non_consecutive_years() {
        assert!("2024-2026".parse::<FinYear>().is_err());
        assert!("2024-2024".parse::<FinYear>().is_err());
        assert!("2024".parse::<FinYear>().is_err());
        assert!("abcd-efgh".parse::<FinYear>().is_err());
    }

    #[test]
    fn containing_splits_at_april() {
        let march = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(FinYear::containing(march).label(), "2024-2025");

        let april = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(FinYear::containing(april).label(), "2025-2026");
    }
}
