//! Unix-timestamp built-ins, all in the local time zone.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use super::number_arg;
use crate::Value;

/// `timestamp(year, month, day, hour, minute, second)`.
///
/// Missing trailing components are `0` and every component may be out of its
/// usual range: month `0` is December of the year before, day `0` the last
/// day of the previous month, `hour = 25` rolls into the next day.
pub fn timestamp(args: &[Value]) -> Value {
    if args.is_empty() {
        return Value::Null;
    }
    let mut parts = [0i64; 6];
    for (slot, arg) in parts.iter_mut().zip(args) {
        match arg.as_int() {
            Ok(n) => *slot = n,
            Err(_) => return Value::Null,
        }
    }
    let [year, month, day, hour, minute, second] = parts;

    normalized(year, month, day, hour, minute, second)
        .and_then(|naive| resolve_local(naive, |t| Local.from_local_datetime(t).earliest()))
        .map_or(Value::Null, |dt| Value::Number(dt.timestamp() as f64))
}

/// A wall-clock time skipped by a DST transition moves forward an hour.
fn resolve_local<T>(
    naive: NaiveDateTime,
    lookup: impl Fn(&NaiveDateTime) -> Option<T>,
) -> Option<T> {
    lookup(&naive).or_else(|| lookup(&naive.checked_add_signed(Duration::try_hours(1)?)?))
}

fn normalized(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Option<NaiveDateTime> {
    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let first_of_month = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;

    let offset = day
        .checked_sub(1)?
        .checked_mul(86_400)?
        .checked_add(hour.checked_mul(3_600)?)?
        .checked_add(minute.checked_mul(60)?)?
        .checked_add(second)?;

    first_of_month
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_seconds(offset)?)
}

pub fn current_timestamp(_args: &[Value]) -> Value {
    Value::Number(Local::now().timestamp() as f64)
}

/// The local date-time of the first argument, read as Unix seconds.
fn local_time(args: &[Value]) -> Option<DateTime<Local>> {
    let secs = number_arg(args, 0)?;
    Local.timestamp_opt(secs as i64, 0).single()
}

fn component(args: &[Value], get: fn(&DateTime<Local>) -> u32) -> Value {
    local_time(args).map_or(Value::Null, |dt| Value::Number(get(&dt) as f64))
}

pub fn year(args: &[Value]) -> Value {
    local_time(args).map_or(Value::Null, |dt| Value::Number(dt.year() as f64))
}

pub fn month(args: &[Value]) -> Value {
    component(args, |dt| dt.month())
}

pub fn day(args: &[Value]) -> Value {
    component(args, |dt| dt.day())
}

pub fn hour(args: &[Value]) -> Value {
    component(args, |dt| dt.hour())
}

pub fn minute(args: &[Value]) -> Value {
    component(args, |dt| dt.minute())
}

pub fn second(args: &[Value]) -> Value {
    component(args, |dt| dt.second())
}
