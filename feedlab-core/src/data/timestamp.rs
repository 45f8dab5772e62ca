//! Timestamp parsing with explicit strftime formats.
//!
//! A format may describe a full timestamp, a date alone or a time of day
//! alone, at any precision. Missing parts take the same defaults pandas uses
//! with an explicit format: 1900 for the year, January and the 1st for month
//! and day, zero for hour, minute and second.

use chrono::format::{ParseResult, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Date assumed when a format carries only a time of day.
pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parse `value` with `format`, filling in whichever parts the format lacks.
///
/// Returns `None` when `value` does not match `format` or names an
/// impossible date or time.
pub fn parse_timestamp(value: &str, format: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, value, StrftimeItems::new(format)).ok()?;

    if parsed.timestamp().is_some() {
        return parsed.to_naive_datetime_with_offset(0).ok();
    }

    let date = if has_date(&parsed) {
        fill_date(&mut parsed).ok()?;
        parsed.to_naive_date().ok()?
    } else {
        default_date()
    };
    let time = if has_time(&parsed) {
        fill_time(&mut parsed).ok()?;
        parsed.to_naive_time().ok()?
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time))
}

fn has_date(parsed: &Parsed) -> bool {
    parsed.year().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_mod_100().is_some()
        || parsed.month().is_some()
        || parsed.day().is_some()
        || parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.weekday().is_some()
}

fn has_time(parsed: &Parsed) -> bool {
    parsed.hour_div_12().is_some()
        || parsed.hour_mod_12().is_some()
        || parsed.minute().is_some()
        || parsed.second().is_some()
        || parsed.nanosecond().is_some()
}

/// Default a missing year to 1900 and a missing month or day to 1, unless
/// the date is given by ordinal or week.
fn fill_date(parsed: &mut Parsed) -> ParseResult<()> {
    let has_year = parsed.year().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_mod_100().is_some();
    if !has_year {
        parsed.set_year(1900)?;
    }

    let by_week = parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if parsed.ordinal().is_none() && !by_week {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }
    Ok(())
}

/// Default a missing hour or minute to 0 and a 12-hour clock without AM/PM
/// to AM. Seconds already default to 0.
fn fill_time(parsed: &mut Parsed) -> ParseResult<()> {
    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (None, None) => parsed.set_hour(0)?,
        (None, Some(_)) => parsed.set_ampm(false)?,
        _ => {}
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

/// Combined format for a date column followed by a time column.
pub fn combined_format(date_format: &str, time_format: &str) -> String {
    format!("{date_format} {time_format}")
}

/// Milliseconds since the Unix epoch, the physical unit of the `datetime` column.
pub fn to_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

pub fn from_millis(ms: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}
