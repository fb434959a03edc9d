//! Calendar helpers: working days of a month and the `DD.MM.YYYY` convention used in summaries.

use chrono::{
    DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveTime, Offset, TimeZone, Weekday,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

static SUMMARY_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}\.\d{2}\.\d{4})").expect("invalid summary date regex"));

const SUMMARY_DATE_FORMAT: &str = "%d.%m.%Y";
const JIRA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const DST_GAP_LOOKBACK_HOURS: i64 = 3;
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Renders `date` as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(SUMMARY_DATE_FORMAT).to_string()
}

/// Extracts the first `DD.MM.YYYY` token from an issue summary. Tokens that are not real dates yield `None`.
pub fn parse_summary_date(summary: &str) -> Option<NaiveDate> {
    let token = SUMMARY_DATE_REGEX.find(summary)?;
    NaiveDate::parse_from_str(token.as_str(), SUMMARY_DATE_FORMAT).ok()
}

pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday to Friday dates of the month containing `reference`, ascending.
pub fn working_days(reference: NaiveDate) -> Vec<NaiveDate> {
    let first = reference - Days::new(u64::from(reference.day0()));
    first
        .iter_days()
        .take_while(|day| day.month() == first.month())
        .filter(|day| is_working_day(*day))
        .collect()
}

pub fn working_days_of_current_month() -> Vec<NaiveDate> {
    working_days(Local::now().date_naive())
}

/// Worklog `started` value for `date` at `start` in the local timezone.
pub fn worklog_started(date: NaiveDate, start: NaiveTime) -> String {
    worklog_started_in(date, start, &Local)
}

pub fn worklog_started_in<Tz>(date: NaiveDate, start: NaiveTime, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let naive = date.and_time(start);
    let moment = tz.from_local_datetime(&naive).earliest().or_else(|| {
        // Skipped by a DST jump: apply the offset in force before the gap.
        let before = naive - Duration::hours(DST_GAP_LOOKBACK_HOURS);
        tz.offset_from_local_datetime(&before).earliest().map(|offset| {
            let utc = naive - Duration::seconds(i64::from(offset.fix().local_minus_utc()));
            tz.from_utc_datetime(&utc)
        })
    });
    match moment {
        Some(moment) => moment.format(JIRA_TIMESTAMP_FORMAT).to_string(),
        None => naive.and_utc().format(JIRA_TIMESTAMP_FORMAT).to_string(),
    }
}

/// Local calendar day of a worklog `started` timestamp.
pub fn started_date(raw: &str) -> Option<NaiveDate> {
    started_date_in(raw, &Local)
}

pub fn started_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|moment| moment.with_timezone(tz).date_naive())
        .ok()
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}
