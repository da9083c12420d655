//! Availability declarations: a member's intent for a date, not a commitment.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::TeamId;

/// Month key in `M-YYYY` form, e.g. `6-2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub month: u32,
    pub year: i32,
}

impl MonthKey {
    pub fn parse(s: &str) -> Option<Self> {
        let (month, year) = s.split_once('-')?;
        let month: u32 = month.parse().ok()?;
        let year: i32 = year.parse().ok()?;
        // The first of the month must be a representable date.
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { month, year })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.month, self.year)
    }
}

/// A member's declared team preferences for one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub member_id: i64,
    pub month: String,
    pub date: NaiveDate,
    pub primary_teams: Vec<TeamId>,
    pub secondary_teams: Vec<TeamId>,
    pub updated_at: String,
}

/// Request body for setting availability on a date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityRequest {
    #[serde(default)]
    pub primary_teams: Vec<TeamId>,
    #[serde(default)]
    pub secondary_teams: Vec<TeamId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_parses_original_format() {
        let key = MonthKey::parse("6-2024").unwrap();
        assert_eq!(key, MonthKey { month: 6, year: 2024 });
        assert_eq!(key.to_string(), "6-2024");
    }

    #[test]
    fn month_key_rejects_garbage() {
        assert!(MonthKey::parse("13-2024").is_none());
        assert!(MonthKey::parse("0-2024").is_none());
        assert!(MonthKey::parse("2024-06").is_none());
        assert!(MonthKey::parse("june").is_none());
        assert!(MonthKey::parse("1-999999").is_none());
        assert!(MonthKey::parse("1--999999").is_none());
    }

    #[test]
    fn month_key_contains() {
        let key = MonthKey::parse("6-2024").unwrap();
        assert!(key.contains(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap()));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2023, 6, 4).unwrap()));
    }
}
