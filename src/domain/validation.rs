use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_RANGE_DAYS: i64 = 365;

/// Inclusive extraction window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateRange {
  pub fn single(day: NaiveDate) -> Self {
    Self { start: day, end: day }
  }
}

pub fn parse_date(date: &str) -> Result<NaiveDate, AppError> {
  NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
    .map_err(|_| AppError::new("INVALID_DATE", format!("Invalid date '{date}'. Use YYYY-MM-DD")))
}

/// Parses and checks a requested window. `end` defaults to `start`.
pub fn validate_date_range(start: &str, end: Option<&str>, today: NaiveDate) -> Result<DateRange, AppError> {
  let start = parse_date(start)?;
  let end = match end {
    Some(end) => parse_date(end)?,
    None => start,
  };

  if start > end {
    return Err(AppError::new("INVALID_RANGE", "Start date cannot be after end date"));
  }
  if start > today || end > today {
    return Err(AppError::new("INVALID_RANGE", "Dates cannot be in the future"));
  }
  if (end - start).num_days() > MAX_RANGE_DAYS {
    return Err(AppError::new(
      "INVALID_RANGE",
      format!("Date range cannot exceed {MAX_RANGE_DAYS} days"),
    ));
  }

  Ok(DateRange { start, end })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
  }

  #[test]
  fn single_date_defaults_the_end() {
    let range = validate_date_range("2024-01-01", None, today()).unwrap();
    assert_eq!(range, DateRange::single(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
  }

  #[test]
  fn rejects_malformed_dates() {
    let err = validate_date_range("01/01/2024", None, today()).unwrap_err();
    assert_eq!(err.code, "INVALID_DATE");
    let err = validate_date_range("2024-01-01", Some("2024-13-01"), today()).unwrap_err();
    assert_eq!(err.code, "INVALID_DATE");
  }

  #[test]
  fn rejects_reversed_ranges() {
    let err = validate_date_range("2024-02-01", Some("2024-01-01"), today()).unwrap_err();
    assert_eq!(err.code, "INVALID_RANGE");
    assert!(err.message.contains("after"));
  }

  #[test]
  fn rejects_future_dates() {
    let err = validate_date_range("2024-06-01", Some("2024-07-01"), today()).unwrap_err();
    assert!(err.message.contains("future"));
  }

  #[test]
  fn single_future_date_is_rejected() {
    let err = validate_date_range("2024-07-01", None, today()).unwrap_err();
    assert_eq!(err.code, "INVALID_RANGE");
    assert!(validate_date_range("2024-06-30", None, today()).is_ok());
  }

  #[test]
  fn caps_the_span_at_one_year() {
    assert!(validate_date_range("2023-06-30", Some("2024-06-29"), today()).is_ok());
    let err = validate_date_range("2023-06-01", Some("2024-06-30"), today()).unwrap_err();
    assert!(err.message.contains("365"));
  }
}
