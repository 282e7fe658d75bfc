//! ISO date helpers for service-log forms.
//!
//! Form dates travel as plain `YYYY-MM-DD` strings (the wire format of the
//! form collaborator); this module is the single place that parses them.

use chrono::{Days, Local, NaiveDate};

/// The date format used by form fields.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` date string.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).ok()
}

/// Format a date as an ISO `YYYY-MM-DD` string.
#[must_use]
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Add `days` calendar days to an ISO date string.
///
/// Returns `None` if the input does not parse as `YYYY-MM-DD` or the result
/// would overflow the calendar.
#[must_use]
pub fn add_days(iso_date: &str, days: u64) -> Option<String> {
    parse_iso_date(iso_date)
        .and_then(|date| date.checked_add_days(Days::new(days)))
        .map(to_iso_date)
}

/// The calendar day after an ISO date string.
///
/// This is the derived-field rule for `end_date`: it always equals
/// `start_date + 1` calendar day, including across month and year boundaries.
#[must_use]
pub fn next_day(iso_date: &str) -> Option<String> {
    add_days(iso_date, 1)
}

/// Today's local date as an ISO string.
#[must_use]
pub fn today_iso() -> String {
    to_iso_date(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_day_simple() {
        assert_eq!(next_day("2024-03-14").as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_next_day_month_boundary() {
        assert_eq!(next_day("2024-04-30").as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_next_day_leap_day() {
        assert_eq!(next_day("2024-02-29").as_deref(), Some("2024-03-01"));
        assert_eq!(next_day("2023-02-28").as_deref(), Some("2023-03-01"));
    }

    #[test]
    fn test_next_day_year_boundary() {
        assert_eq!(next_day("2023-12-31").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_next_day_invalid_input() {
        assert!(next_day("").is_none());
        assert!(next_day("not-a-date").is_none());
        assert!(next_day("2024-13-01").is_none());
        assert!(next_day("2023-02-29").is_none());
    }

    #[test]
    fn test_add_days_multiple() {
        assert_eq!(add_days("2024-01-30", 3).as_deref(), Some("2024-02-02"));
    }

    #[test]
    fn test_today_iso_format() {
        let today = today_iso();
        assert!(parse_iso_date(&today).is_some());
        assert_eq!(today.len(), 10);
    }

    #[test]
    fn test_to_iso_date_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(to_iso_date(date), "2024-01-05");
    }
}
