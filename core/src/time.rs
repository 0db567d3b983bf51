use chrono::{Duration, NaiveDate};

use crate::error::{Result, TrackerError};

/// Resolves the date given for an entry relative to `today`.
///
/// Accepts `today`, `yesterday`, `-Nd` and `YYYY-MM-DD` / `YYYY/MM/DD`.
pub fn parse_entry_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" => return days_before(today, 1, input),
        _ => {}
    }

    // 2. Relative days back (-3d)
    if let Some(rest) = input.strip_prefix('-') {
        if let Some(num_str) = rest.strip_suffix('d') {
            let count: i64 = num_str
                .parse()
                .map_err(|_| TrackerError::Validation(format!("invalid relative date: {}", input)))?;
            return days_before(today, count, input);
        }
    }

    // 3. Calendar formats
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(date);
        }
    }

    Err(TrackerError::Validation(format!("could not parse date: {}", input)))
}

fn days_before(today: NaiveDate, count: i64, input: &str) -> Result<NaiveDate> {
    Duration::try_days(count)
        .and_then(|delta| today.checked_sub_signed(delta))
        .ok_or_else(|| TrackerError::Validation(format!("date out of range: {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_entry_date("today", anchor()).unwrap(), anchor());
        assert_eq!(
            parse_entry_date("yesterday", anchor()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(
            parse_entry_date("-3d", anchor()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
        );
        assert!(parse_entry_date("-xd", anchor()).is_err());
    }

    #[test]
    fn test_relative_days_out_of_range() {
        let err = parse_entry_date("-999999999d", anchor()).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert!(parse_entry_date(&format!("-{}d", i64::MAX), anchor()).is_err());
    }

    #[test]
    fn test_calendar_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(parse_entry_date("2024-05-07", anchor()).unwrap(), expected);
        assert_eq!(parse_entry_date("2024/05/07", anchor()).unwrap(), expected);
        assert!(parse_entry_date("2024-02-30", anchor()).is_err());
    }
}
