// Date parsing and display helpers

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use anyhow::{anyhow, Result};

/// Parse a date expression and return a Unix timestamp (UTC)
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, RFC 3339, and the relative
/// words `today` and `tomorrow`. Dates without a time are local midnight.
pub fn parse_date_expr(expr: &str) -> Result<i64> {
    let expr = expr.trim();

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return local_midnight(date);
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M") {
        let local_dt = Local.from_local_datetime(&datetime)
            .single()
            .ok_or_else(|| anyhow!("Ambiguous datetime: {}", expr))?;
        return Ok(local_dt.timestamp());
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(expr) {
        return Ok(datetime.timestamp());
    }

    let today = Local::now().date_naive();
    match expr.to_ascii_lowercase().as_str() {
        "today" => local_midnight(today),
        "tomorrow" => local_midnight(today + chrono::Duration::days(1)),
        _ => Err(anyhow!("Unsupported date '{}'. Use YYYY-MM-DD.", expr)),
    }
}

fn local_midnight(date: NaiveDate) -> Result<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date"))?;
    // Local midnight can be skipped by DST; take the earliest valid instant
    let local_dt = Local.from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| anyhow!("Invalid local date: {}", date))?;
    Ok(local_dt.timestamp())
}

/// Format a timestamp as "Jan 5, 2026", or "Not set"
pub fn format_date(ts: Option<i64>) -> String {
    match ts.and_then(|ts| Local.timestamp_opt(ts, 0).single()) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => "Not set".to_string(),
    }
}

/// Format a timestamp as an ISO date (`2026-01-05`), empty when unset
pub fn format_iso_date(ts: Option<i64>) -> String {
    ts.and_then(|ts| Local.timestamp_opt(ts, 0).single())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_date_round_trips_through_format() {
        let ts = parse_date_expr("2026-01-10").unwrap();
        assert_eq!(format_iso_date(Some(ts)), "2026-01-10");
        assert_eq!(format_date(Some(ts)), "Jan 10, 2026");
    }

    #[test]
    fn test_parse_datetime() {
        let date = parse_date_expr("2026-01-10").unwrap();
        let datetime = parse_date_expr("2026-01-10T14:30").unwrap();
        assert_eq!(datetime - date, 14 * 3600 + 30 * 60);
    }

    #[test]
    fn test_parse_relative() {
        let today = parse_date_expr("today").unwrap();
        let tomorrow = parse_date_expr("Tomorrow").unwrap();
        assert!(tomorrow > today);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_expr("next week").is_err());
        assert!(parse_date_expr("2026-13-01").is_err());
        assert!(parse_date_expr("").is_err());
    }

    #[test]
    fn test_format_unset() {
        assert_eq!(format_date(None), "Not set");
        assert_eq!(format_iso_date(None), "");
    }
}
