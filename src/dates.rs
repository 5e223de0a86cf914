//! Calendar helpers for Monday-aligned weeks and calendar months.
//!
//! All values are local wall-clock dates; no timezone conversion happens here.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored workout date.
///
/// Accepts `YYYY-MM-DD` or a longer ISO timestamp whose first ten characters
/// are such a date. Years outside `1..=9999` are rejected so that period
/// arithmetic can never leave chrono's supported range.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok().or_else(|| {
        let (head, rest) = (s.get(..10)?, s.get(10..)?);
        if rest.starts_with('T') || rest.starts_with(' ') {
            NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
        } else {
            None
        }
    })?;
    (1..=9999).contains(&date.year()).then_some(date)
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// 00:00:00.000 on `d`.
pub fn day_start(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on `d`.
pub fn day_end(d: NaiveDate) -> NaiveDateTime {
    day_start(d) + Duration::days(1) - Duration::milliseconds(1)
}

pub fn start_of_week_monday(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_monday()))
}

pub fn end_of_week_sunday(d: NaiveDate) -> NaiveDate {
    start_of_week_monday(d) + Duration::days(6)
}

/// `{year}-{week}` where the year is taken from the week's Monday and weeks
/// are counted from the Monday on or before January 4 of that year.
///
/// This differs from ISO-8601 around the new year: the Monday 2024-12-30
/// yields `2024-53`, not `2025-01`. Keys are only required to be stable and
/// unique per week.
pub fn week_key(d: NaiveDate) -> String {
    let start = start_of_week_monday(d);
    let year = start.year();
    let first = NaiveDate::from_ymd_opt(year, 1, 4)
        .map(start_of_week_monday)
        .unwrap_or(start);
    let week = (start - first).num_days().div_euclid(7) + 1;
    format!("{year}-{week:02}")
}

pub fn week_label(d: NaiveDate) -> String {
    format!(
        "{} to {}",
        format_date(start_of_week_monday(d)),
        format_date(end_of_week_sunday(d))
    )
}

/// Key of the week immediately before the week starting at `from`.
pub fn prev_week_key_from(from: NaiveDate) -> String {
    week_key(from - Duration::days(7))
}

pub fn start_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn end_of_month(d: NaiveDate) -> NaiveDate {
    let start = start_of_month(d);
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start)
}

pub fn month_key(d: NaiveDate) -> String {
    format!("{}-{:02}", d.year(), d.month())
}

pub fn month_label(d: NaiveDate) -> String {
    month_key(d)
}

/// Key of the calendar month before the one containing `from`.
pub fn prev_month_key_from(from: NaiveDate) -> String {
    let start = start_of_month(from);
    month_key(start.checked_sub_months(Months::new(1)).unwrap_or(start))
}
