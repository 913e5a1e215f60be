//! Due date parsing
//!
//! Accepts `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday` and relative
//! offsets such as `+3` or `-1` (days from today).

use chrono::{Days, Local, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD, today, tomorrow, or +N")]
    Invalid(String),

    #[error("Date offset out of range: {0}")]
    OutOfRange(String),
}

/// Returns today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a date expression relative to `today`
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let input = input.trim();

    match input.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return offset(today, 1, input),
        "yesterday" => return offset(today, -1, input),
        _ => {}
    }

    if input.starts_with('+') || input.starts_with('-') {
        let days: i64 = input
            .parse()
            .map_err(|_| DateError::Invalid(input.to_string()))?;
        return offset(today, days, input);
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| DateError::Invalid(input.to_string()))
}

/// Shifts `date` by a signed number of days
pub fn offset(date: NaiveDate, days: i64, input: &str) -> Result<NaiveDate, DateError> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| DateError::OutOfRange(input.to_string()))
}
