//! Tolerant date parsing for loosely formatted source text.
//!
//! The source table carries dates typed by hand in several shapes
//! ("2024-04-05", "2024.4.5", "4/5"). The catalog never rejects a product
//! over a bad date: `sort_key` folds unparseable text to the minimum
//! timestamp so those rows sort as the oldest rather than dropping out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Year assumed for month/day-only inputs ("4/5"). Arbitrary but fixed, so
/// parsing stays a pure function of its input.
const MONTH_DAY_YEAR: i32 = 2000;

/// Datetime formats tried in order for full parses.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only formats tried in order.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a loosely formatted date string.
///
/// Tries, in order: month/day-only (assuming a fixed year), the datetime
/// formats, then the date-only formats at midnight. Returns `None` when
/// nothing matches.
#[must_use]
pub fn parse_loose(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_month_day(trimmed) {
        return Some(at_midnight(date));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(at_midnight(date));
        }
    }

    None
}

/// Sort key for descending-by-date ordering: unparseable values sort as the
/// earliest possible instant instead of being dropped.
#[must_use]
pub fn sort_key(raw: &str) -> DateTime<Utc> {
    parse_loose(raw).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse "M/D" or "M-D" with no year.
fn parse_month_day(s: &str) -> Option<NaiveDate> {
    let (month, day) = s.split_once(['/', '-'])?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(MONTH_DAY_YEAR, month, day)
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
