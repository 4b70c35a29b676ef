use chrono::{DateTime, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::util::f64_to_i64_safe;

const RELATIVE_DATE_MAX_AMOUNT: u32 = 10_000;

lazy_static! {
    static ref RELATIVE_DATE_REGEX: Regex = Regex::new(r"^-?(?P<amount>[0-9]+)(?P<unit>[hdwmy])$").unwrap();
}

/// Interpret a string as a point in time.
///
/// Accepted forms, in order:
///  * RFC3339/ISO8601 timestamp with offset (example: "2016-04-16T17:09:12.759-07:00")
///  * ISO8601 timestamp without offset, taken as UTC (example: "2016-04-16T17:09:12")
///  * ISO8601 calendar date, taken as midnight UTC (example: "2016-04-16")
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Interpret a number as Unix epoch milliseconds.
pub(crate) fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    f64_to_i64_safe(millis).and_then(|millis| match Utc.timestamp_millis_opt(millis) {
        LocalResult::None | LocalResult::Ambiguous(_, _) => None,
        LocalResult::Single(time) => Some(time),
    })
}

/// Resolve a relative date such as "-7d" or "2w" to the instant that many units before `now`.
///
/// Units are h(ours), d(ays), w(eeks), m(onths) and y(ears). The leading minus sign is optional
/// since a relative date always looks into the past. Amounts of 10000 or more are rejected.
pub(crate) fn parse_relative_date(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let captures = RELATIVE_DATE_REGEX.captures(s.trim())?;
    let amount: u32 = captures.name("amount")?.as_str().parse().ok()?;
    if amount >= RELATIVE_DATE_MAX_AMOUNT {
        return None;
    }

    match captures.name("unit")?.as_str() {
        "h" => now.checked_sub_signed(Duration::hours(amount.into())),
        "d" => now.checked_sub_signed(Duration::days(amount.into())),
        "w" => now.checked_sub_signed(Duration::weeks(amount.into())),
        "m" => now.checked_sub_months(Months::new(amount)),
        "y" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}
