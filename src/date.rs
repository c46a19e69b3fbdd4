//! Submission date expressions
//!
//! The submission date on a cover page is free text. When it looks like a
//! date expression (`today`, `friday+1`, `2026-02-16`, ...) it is resolved
//! and printed in the cover's `16 Feb 2026` style; anything else is kept
//! as typed.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::error::{Error, Result};

/// Date expression types
#[derive(Debug, Clone, PartialEq)]
pub enum DateExpression {
    /// Use today's date
    Today,
    /// The day after today
    Tomorrow,
    /// Use an explicit date
    Explicit(NaiveDate),
    /// A number of days after today
    DaysFromToday(u32),
    /// Next occurrence of a day of week, `offset` weeks later
    DayOfWeek { day: Weekday, offset: u32 },
    /// No date (empty input)
    None,
}

const EXPLICIT_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%b %d, %Y", "%m/%d/%Y"];

/// Parse a date expression
///
/// Supported forms:
/// - `""` → None
/// - `"today"`, `"tomorrow"`
/// - `"2026-02-16"`, `"16 Feb 2026"`, `"16 February 2026"`, `"Feb 16, 2026"`, `"02/16/2026"`
/// - `"+10"` → ten days from today
/// - `"Friday"` → next Friday (today if today is Friday)
/// - `"Friday+2"` → two weeks after next Friday
pub fn parse_date_expression(expr: &str) -> Result<DateExpression> {
    let expr = expr.trim();

    if expr.is_empty() {
        return Ok(DateExpression::None);
    }
    if expr.eq_ignore_ascii_case("today") {
        return Ok(DateExpression::Today);
    }
    if expr.eq_ignore_ascii_case("tomorrow") {
        return Ok(DateExpression::Tomorrow);
    }

    for format in EXPLICIT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(expr, format) {
            return Ok(DateExpression::Explicit(date));
        }
    }

    if let Some(days) = expr.strip_prefix('+') {
        let days = parse_count(days)?;
        return Ok(DateExpression::DaysFromToday(days));
    }

    match expr.split_once('+') {
        Some((day, offset)) => Ok(DateExpression::DayOfWeek {
            day: parse_weekday(day)?,
            offset: parse_count(offset)?,
        }),
        None => Ok(DateExpression::DayOfWeek {
            day: parse_weekday(expr)?,
            offset: 0,
        }),
    }
}

fn parse_count(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidDateExpression(format!("Invalid offset: {}", s.trim())))
}

/// Parse a weekday name (case-insensitive)
fn parse_weekday(s: &str) -> Result<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        other => Err(Error::InvalidDateExpression(format!("Unknown weekday: {}", other))),
    }
}

/// Resolve an expression relative to `today`. Offsets that run past the
/// calendar's range resolve to `None`.
pub fn resolve_on(expr: &DateExpression, today: NaiveDate) -> Option<NaiveDate> {
    match expr {
        DateExpression::None => None,
        DateExpression::Today => Some(today),
        DateExpression::Tomorrow => today.succ_opt(),
        DateExpression::Explicit(date) => Some(*date),
        DateExpression::DaysFromToday(days) => add_days(today, *days as i64),
        DateExpression::DayOfWeek { day, offset } => next_weekday(today, *day, *offset),
    }
}

/// Resolve an expression relative to the local date
pub fn resolve_date(expr: &DateExpression) -> Option<NaiveDate> {
    resolve_on(expr, Local::now().date_naive())
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Next occurrence of `target` on or after `today`, plus `offset` weeks
fn next_weekday(today: NaiveDate, target: Weekday, offset: u32) -> Option<NaiveDate> {
    let today_num = today.weekday().num_days_from_monday() as i64;
    let target_num = target.num_days_from_monday() as i64;
    let days_until = (target_num - today_num).rem_euclid(7);
    add_days(today, days_until + offset as i64 * 7)
}

/// Format a date the way cover pages print it: "16 Feb 2026"
pub fn format_submission_date(date: &NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Resolve `input` against `today`; input that is not a date expression, or
/// that lands outside the calendar, is returned unchanged
pub fn resolve_submission_date_on(input: &str, today: NaiveDate) -> String {
    match parse_date_expression(input) {
        Ok(DateExpression::None) => String::new(),
        Ok(expr) => match resolve_on(&expr, today) {
            Some(date) => format_submission_date(&date),
            None => input.to_string(),
        },
        Err(_) => input.to_string(),
    }
}

/// [`resolve_submission_date_on`] for the local date
pub fn resolve_submission_date(input: &str) -> String {
    resolve_submission_date_on(input, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-02-16 is a Monday
    fn monday() -> NaiveDate {
        date(2026, 2, 16)
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_date_expression("").unwrap(), DateExpression::None);
        assert_eq!(parse_date_expression("   ").unwrap(), DateExpression::None);
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_date_expression("Today").unwrap(), DateExpression::Today);
        assert_eq!(parse_date_expression("TOMORROW").unwrap(), DateExpression::Tomorrow);
        assert_eq!(parse_date_expression("+10").unwrap(), DateExpression::DaysFromToday(10));
    }

    #[test]
    fn test_parse_explicit_formats() {
        let inputs = [
            "2026-02-16",
            "16 Feb 2026",
            "16 February 2026",
            "Feb 16, 2026",
            "02/16/2026",
        ];
        for input in inputs {
            assert_eq!(
                parse_date_expression(input).unwrap(),
                DateExpression::Explicit(monday()),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_weekday_with_offset() {
        assert_eq!(
            parse_date_expression("friday").unwrap(),
            DateExpression::DayOfWeek { day: Weekday::Fri, offset: 0 }
        );
        assert_eq!(
            parse_date_expression("Mon + 2").unwrap(),
            DateExpression::DayOfWeek { day: Weekday::Mon, offset: 2 }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_expression("Spring Term").is_err());
        assert!(parse_date_expression("2026-13-01").is_err());
        assert!(parse_date_expression("Tuesday+abc").is_err());
        assert!(parse_date_expression("+soon").is_err());
    }

    #[test]
    fn test_resolve_relative_expressions() {
        let today = monday();
        assert_eq!(resolve_on(&DateExpression::None, today), None);
        assert_eq!(resolve_on(&DateExpression::Today, today), Some(today));
        assert_eq!(resolve_on(&DateExpression::Tomorrow, today), Some(date(2026, 2, 17)));
        assert_eq!(
            resolve_on(&DateExpression::DaysFromToday(14), today),
            Some(date(2026, 3, 2))
        );
    }

    #[test]
    fn test_next_weekday() {
        let today = monday();
        assert_eq!(next_weekday(today, Weekday::Mon, 0), Some(today));
        assert_eq!(next_weekday(today, Weekday::Fri, 0), Some(date(2026, 2, 20)));
        assert_eq!(next_weekday(today, Weekday::Sun, 0), Some(date(2026, 2, 22)));
        assert_eq!(next_weekday(today, Weekday::Mon, 1), Some(date(2026, 2, 23)));
        // Saturday to Tuesday wraps into the next week
        assert_eq!(
            next_weekday(date(2026, 2, 21), Weekday::Tue, 0),
            Some(date(2026, 2, 24))
        );
    }

    #[test]
    fn test_offsets_past_the_calendar_are_kept_verbatim() {
        let today = monday();
        assert_eq!(resolve_on(&DateExpression::DaysFromToday(4_000_000_000), today), None);
        assert_eq!(next_weekday(today, Weekday::Fri, 999_999_999), None);
        assert_eq!(resolve_submission_date_on("+4000000000", today), "+4000000000");
        assert_eq!(resolve_submission_date_on("friday+999999999", today), "friday+999999999");
        assert_eq!(resolve_on(&DateExpression::Tomorrow, NaiveDate::MAX), None);
    }

    #[test]
    fn test_format_submission_date() {
        assert_eq!(format_submission_date(&monday()), "16 Feb 2026");
        assert_eq!(format_submission_date(&date(2026, 1, 7)), "7 Jan 2026");
    }

    #[test]
    fn test_resolve_submission_date_on() {
        let today = monday();
        assert_eq!(resolve_submission_date_on("today", today), "16 Feb 2026");
        assert_eq!(resolve_submission_date_on("friday+1", today), "27 Feb 2026");
        assert_eq!(resolve_submission_date_on("2026-03-01", today), "1 Mar 2026");
        assert_eq!(resolve_submission_date_on("End of Spring Term", today), "End of Spring Term");
        assert_eq!(resolve_submission_date_on("", today), "");
    }

    #[test]
    fn test_resolve_date_uses_local_today() {
        let resolved = resolve_date(&DateExpression::Today).unwrap();
        assert_eq!(resolved, Local::now().date_naive());
    }
}
