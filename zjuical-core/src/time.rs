//! Period, weekday and week-number arithmetic.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::error::{ZjuicalError, ZjuicalResult};

/// Length of one class period in minutes.
pub const SESSION_MINUTES: i64 = 45;

/// Start time (hour, minute) of periods 1 through 15.
const PERIOD_STARTS: [(u32, u32); 15] = [
    (8, 0),
    (8, 50),
    (10, 0),
    (10, 50),
    (11, 40),
    (13, 25),
    (14, 15),
    (15, 5),
    (16, 15),
    (17, 5),
    (18, 50),
    (19, 40),
    (20, 30),
    (21, 20),
    (22, 10),
];

const WEEKDAY_NAMES: [&str; 7] = [
    "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
];

pub fn session_length() -> Duration {
    Duration::minutes(SESSION_MINUTES)
}

/// Wall-clock start of a 1-based period.
pub fn period_start(period: u32) -> ZjuicalResult<NaiveTime> {
    let index = period
        .checked_sub(1)
        .filter(|i| (*i as usize) < PERIOD_STARTS.len())
        .ok_or(ZjuicalError::UnknownPeriod(period))?;

    let (hour, minute) = PERIOD_STARTS[index as usize];
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ZjuicalError::UnknownPeriod(period))
}

/// Wall-clock end of a 1-based period.
pub fn period_end(period: u32) -> ZjuicalResult<NaiveTime> {
    Ok(period_start(period)? + session_length())
}

pub fn is_valid_period(period: u32) -> bool {
    (1..=PERIOD_STARTS.len() as u32).contains(&period)
}

/// Chinese weekday name for a day number (1 = Monday … 7 = Sunday).
pub fn weekday_name(day: u32) -> ZjuicalResult<&'static str> {
    day.checked_sub(1)
        .and_then(|i| WEEKDAY_NAMES.get(i as usize))
        .copied()
        .ok_or(ZjuicalError::UnknownWeekday(day))
}

/// Day number of a date (1 = Monday … 7 = Sunday).
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// "第3节" for a single period, "第3-4节" for a span; `end` is exclusive.
pub fn period_span_label(start: u32, end: u32) -> String {
    if start + 1 >= end {
        format!("第{}节", start)
    } else {
        format!("第{}-{}节", start, end - 1)
    }
}

/// Monday of the week numbered 1, given the term's first day and the number
/// assigned to the week containing it.
pub fn monday_of_first_week(begin: NaiveDate, first_week_number: u32) -> NaiveDate {
    let offset = i64::from(day_of_week(begin)) - 1;
    let earlier_weeks = i64::from(first_week_number.saturating_sub(1));
    begin - Duration::days(offset) - Duration::weeks(earlier_weeks)
}

/// Week 1 is odd, so a week index of 1 modulo 2 is an even week.
pub fn is_even_week(monday_of_first_week: NaiveDate, date: NaiveDate) -> bool {
    (date - monday_of_first_week).num_days().div_euclid(7).rem_euclid(2) == 1
}

/// Convert an 8-digit YYYYMMDD integer into a date.
pub fn date_from_yyyymmdd(value: u32) -> ZjuicalResult<NaiveDate> {
    let (year, month, day) = (value / 10_000, value / 100 % 100, value % 100);

    if !(1000..=9999).contains(&year) {
        return Err(ZjuicalError::Config(format!(
            "Invalid date '{}'. Expected YYYYMMDD",
            value
        )));
    }

    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
        ZjuicalError::Config(format!("Invalid date '{}'. Expected YYYYMMDD", value))
    })
}

/// Every date from `from` to `to`, both inclusive.
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}
