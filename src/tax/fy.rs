use crate::error::ConfigurationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Indian Financial Year (runs 1 April to 31 March).
/// The year value is the start year (e.g., 2024 = FY 2024-25).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinancialYear(pub i32);

impl FinancialYear {
    /// Parse the conventional "2024-25" form.
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidFinancialYear(s.to_string());
        let (start, suffix) = s.split_once('-').ok_or_else(invalid)?;
        let start: i32 = start.parse().map_err(|_| invalid())?;
        if start < 1900 || suffix.len() != 2 {
            return Err(invalid());
        }
        let suffix: i32 = suffix.parse().map_err(|_| invalid())?;
        if suffix != (start + 1).rem_euclid(100) {
            return Err(invalid());
        }
        Ok(FinancialYear(start))
    }

    /// Financial year containing a date. The year starts 1 April, so
    /// dates in January-March fall in the year that started the previous April.
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            FinancialYear(date.year())
        } else {
            FinancialYear(date.year() - 1)
        }
    }

    /// Display as "2024-25" format.
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl std::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for FinancialYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for FinancialYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FinancialYear::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_year() {
        assert_eq!(FinancialYear::parse("2024-25"), Ok(FinancialYear(2024)));
        assert_eq!(FinancialYear::parse("2023-24"), Ok(FinancialYear(2023)));
        // Century rollover
        assert_eq!(FinancialYear::parse("2099-00"), Ok(FinancialYear(2099)));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(FinancialYear::parse("2024").is_err());
        assert!(FinancialYear::parse("2024-26").is_err());
        assert!(FinancialYear::parse("2024-2025").is_err());
        assert!(FinancialYear::parse("24-25").is_err());
        assert!(FinancialYear::parse("abcd-ef").is_err());
    }

    #[test]
    fn from_date_before_april() {
        // 31 March 2025 is still FY 2024-25
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(FinancialYear::from_date(date), FinancialYear(2024));
    }

    #[test]
    fn from_date_on_april_1() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(FinancialYear::from_date(date), FinancialYear(2025));
    }

    #[test]
    fn from_date_december() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(FinancialYear::from_date(date), FinancialYear(2024));
    }

    #[test]
    fn display_format() {
        assert_eq!(FinancialYear(2024).display(), "2024-25");
        assert_eq!(FinancialYear(2099).display(), "2099-00");
    }

    #[test]
    fn serde_round_trip() {
        let fy = FinancialYear(2024);
        let json = serde_json::to_string(&fy).unwrap();
        assert_eq!(json, "\"2024-25\"");
        let back: FinancialYear = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fy);
    }
}
