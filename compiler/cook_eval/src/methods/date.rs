//! `Date`, computed in UTC.
//!
//! A date is a millisecond time value; NaN marks an invalid date. Local
//! time is UTC, so the `UTC` getters and setters coincide with the plain
//! ones and `getTimezoneOffset` is 0.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

use super::{arg, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Object, ObjectKind, Value};

const MS_PER_DAY: f64 = 86_400_000.0;
/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;
const MAX_TIME: f64 = 8.64e15;

pub(crate) const METHODS: MethodTable = &[
    ("getDate", get_date),
    ("getDay", get_day),
    ("getFullYear", get_full_year),
    ("getHours", get_hours),
    ("getMilliseconds", get_milliseconds),
    ("getMinutes", get_minutes),
    ("getMonth", get_month),
    ("getSeconds", get_seconds),
    ("getTime", get_time),
    ("getTimezoneOffset", get_timezone_offset),
    ("getUTCDate", get_date),
    ("getUTCDay", get_day),
    ("getUTCFullYear", get_full_year),
    ("getUTCHours", get_hours),
    ("getUTCMilliseconds", get_milliseconds),
    ("getUTCMinutes", get_minutes),
    ("getUTCMonth", get_month),
    ("getUTCSeconds", get_seconds),
    ("setDate", set_date),
    ("setFullYear", set_full_year),
    ("setHours", set_hours),
    ("setMilliseconds", set_milliseconds),
    ("setMinutes", set_minutes),
    ("setMonth", set_month),
    ("setSeconds", set_seconds),
    ("setTime", set_time),
    ("setUTCDate", set_date),
    ("setUTCFullYear", set_full_year),
    ("setUTCHours", set_hours),
    ("setUTCMilliseconds", set_milliseconds),
    ("setUTCMinutes", set_minutes),
    ("setUTCMonth", set_month),
    ("setUTCSeconds", set_seconds),
    ("toDateString", to_date_only_string),
    ("toISOString", to_iso),
    ("toJSON", to_json),
    ("toLocaleDateString", to_locale_date_string),
    ("toLocaleString", to_locale_string),
    ("toLocaleTimeString", to_locale_time_string),
    ("toString", to_string),
    ("toTimeString", to_time_string),
    ("toUTCString", to_utc_string),
    ("valueOf", get_time),
];

// Time arithmetic

fn make_time(hours: f64, minutes: f64, seconds: f64, ms: f64) -> f64 {
    if ![hours, minutes, seconds, ms].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    hours.trunc() * 3_600_000.0 + minutes.trunc() * 60_000.0 + seconds.trunc() * 1000.0 + ms.trunc()
}

/// Day number of `year`-`month`-`date`; months outside `0..12` carry over
/// into the year.
fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if ![year, month, date].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    let (year, month, date) = (year.trunc(), month.trunc(), date.trunc());
    let full_year = year + (month / 12.0).floor();
    if full_year.abs() > 400_000.0 {
        return f64::NAN;
    }
    let month = month.rem_euclid(12.0) as u32;
    let Some(first) = NaiveDate::from_ymd_opt(full_year as i32, month + 1, 1) else {
        return f64::NAN;
    };
    let days = i64::from(first.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
    days as f64 + date - 1.0
}

fn make_date(day: f64, time: f64) -> f64 {
    day * MS_PER_DAY + time
}

fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME {
        f64::NAN
    } else {
        time.trunc() + 0.0
    }
}

/// Calendar fields of a time value.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Fields {
    year: f64,
    /// Zero-based.
    month: f64,
    date: f64,
    hours: f64,
    minutes: f64,
    seconds: f64,
    ms: f64,
}

impl Fields {
    fn of(time: f64) -> Option<Self> {
        let dt = datetime(time)?;
        Some(Fields {
            year: f64::from(dt.year()),
            month: f64::from(dt.month0()),
            date: f64::from(dt.day()),
            hours: f64::from(dt.hour()),
            minutes: f64::from(dt.minute()),
            seconds: f64::from(dt.second()),
            ms: f64::from(dt.timestamp_subsec_millis()),
        })
    }

    fn time(self) -> f64 {
        time_clip(make_date(
            make_day(self.year, self.month, self.date),
            make_time(self.hours, self.minutes, self.seconds, self.ms),
        ))
    }
}

fn datetime(time: f64) -> Option<DateTime<Utc>> {
    if time.is_nan() {
        return None;
    }
    DateTime::from_timestamp_millis(time as i64)
}

pub(crate) fn now() -> f64 {
    Utc::now().timestamp_millis() as f64
}

// Formatting

const INVALID_DATE: &str = "Invalid Date";

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:06}", -year)
    } else {
        format!("{year:04}")
    }
}

/// `Date.prototype.toString` form.
pub(crate) fn to_date_string(time: f64) -> String {
    match datetime(time) {
        Some(dt) => format!(
            "{} {} {} {}",
            dt.format("%a %b %d"),
            format_year(dt.year()),
            dt.format("%H:%M:%S"),
            "GMT+0000 (Coordinated Universal Time)"
        ),
        None => INVALID_DATE.to_string(),
    }
}

/// `Date.prototype.toISOString` form, `None` for invalid dates.
pub(crate) fn to_iso_string(time: f64) -> Option<String> {
    let dt = datetime(time)?;
    let year = dt.year();
    let year = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else if year < 0 {
        format!("-{:06}", -year)
    } else {
        format!("+{year:06}")
    };
    Some(format!("{year}-{}", dt.format("%m-%dT%H:%M:%S%.3fZ")))
}

fn this_time(this: &Value, method: &str) -> EvalResult<f64> {
    this.as_object()
        .and_then(|obj| match obj.borrow().kind {
            ObjectKind::Date(time) => Some(time),
            _ => None,
        })
        .ok_or_else(|| errors::wrong_receiver(method, "Date"))
}

fn formatted(this: &Value, method: &str, f: impl FnOnce(DateTime<Utc>) -> String) -> EvalResult<Value> {
    Ok(Value::from(
        datetime(this_time(this, method)?).map_or_else(|| INVALID_DATE.to_string(), f),
    ))
}

fn to_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(to_date_string(this_time(this, "toString")?)))
}

fn to_date_only_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toDateString", |dt| {
        format!("{} {}", dt.format("%a %b %d"), format_year(dt.year()))
    })
}

fn to_time_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toTimeString", |dt| {
        format!("{} GMT+0000 (Coordinated Universal Time)", dt.format("%H:%M:%S"))
    })
}

fn to_utc_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toUTCString", |dt| {
        format!(
            "{} {} {} GMT",
            dt.format("%a, %d %b"),
            format_year(dt.year()),
            dt.format("%H:%M:%S")
        )
    })
}

fn to_locale_date_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toLocaleDateString", |dt| dt.format("%-m/%-d/%Y").to_string())
}

fn to_locale_time_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toLocaleTimeString", |dt| dt.format("%-I:%M:%S %p").to_string())
}

fn to_locale_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    formatted(this, "toLocaleString", |dt| {
        dt.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    })
}

fn to_iso(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    to_iso_string(this_time(this, "toISOString")?)
        .map(Value::from)
        .ok_or_else(errors::invalid_time_value)
}

fn to_json(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(to_iso_string(this_time(this, "toJSON")?).map_or(Value::Null, Value::from))
}

// Getters

fn getter(this: &Value, method: &str, field: impl FnOnce(Fields) -> f64) -> EvalResult<Value> {
    let time = this_time(this, method)?;
    Ok(Value::Number(Fields::of(time).map_or(f64::NAN, field)))
}

fn get_time(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(this_time(this, "getTime")?))
}

fn get_full_year(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getFullYear", |f| f.year)
}

fn get_month(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getMonth", |f| f.month)
}

fn get_date(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getDate", |f| f.date)
}

fn get_hours(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getHours", |f| f.hours)
}

fn get_minutes(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getMinutes", |f| f.minutes)
}

fn get_seconds(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getSeconds", |f| f.seconds)
}

fn get_milliseconds(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    getter(this, "getMilliseconds", |f| f.ms)
}

fn get_day(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let time = this_time(this, "getDay")?;
    Ok(Value::Number(
        datetime(time).map_or(f64::NAN, |dt| f64::from(dt.weekday().num_days_from_sunday())),
    ))
}

fn get_timezone_offset(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let time = this_time(this, "getTimezoneOffset")?;
    Ok(Value::Number(if time.is_nan() { f64::NAN } else { 0.0 }))
}

// Setters

fn store(this: &Value, time: f64) -> Value {
    if let Some(obj) = this.as_object() {
        if let ObjectKind::Date(slot) = &mut obj.borrow_mut().kind {
            *slot = time;
        }
    }
    Value::Number(time)
}

/// Numeric arguments, converted up front.
fn numbers(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter().map(|value| interp.to_number(value)).collect()
}

/// Run a setter: `update` overwrites fields from the converted arguments.
/// `from_invalid` allows starting from an invalid date (as `setFullYear`
/// does, from +0).
fn setter(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    method: &str,
    from_invalid: bool,
    update: impl FnOnce(&mut Fields, &[f64]),
) -> EvalResult<Value> {
    let time = this_time(this, method)?;
    let values = numbers(interp, args)?;
    let base = if time.is_nan() && from_invalid { 0.0 } else { time };
    let Some(mut fields) = Fields::of(base) else {
        return Ok(Value::Number(f64::NAN));
    };
    if values.is_empty() {
        return Ok(store(this, f64::NAN));
    }
    update(&mut fields, &values);
    Ok(store(this, fields.time()))
}

fn set_time(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    this_time(this, "setTime")?;
    let time = interp.to_number(&arg(args, 0))?;
    Ok(store(this, time_clip(time)))
}

fn set_full_year(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setFullYear", true, |f, v| {
        f.year = v[0];
        if let Some(&month) = v.get(1) {
            f.month = month;
        }
        if let Some(&date) = v.get(2) {
            f.date = date;
        }
    })
}

fn set_month(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setMonth", false, |f, v| {
        f.month = v[0];
        if let Some(&date) = v.get(1) {
            f.date = date;
        }
    })
}

fn set_date(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setDate", false, |f, v| f.date = v[0])
}

fn set_hours(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setHours", false, |f, v| {
        f.hours = v[0];
        if let Some(&minutes) = v.get(1) {
            f.minutes = minutes;
        }
        if let Some(&seconds) = v.get(2) {
            f.seconds = seconds;
        }
        if let Some(&ms) = v.get(3) {
            f.ms = ms;
        }
    })
}

fn set_minutes(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setMinutes", false, |f, v| {
        f.minutes = v[0];
        if let Some(&seconds) = v.get(1) {
            f.seconds = seconds;
        }
        if let Some(&ms) = v.get(2) {
            f.ms = ms;
        }
    })
}

fn set_seconds(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setSeconds", false, |f, v| {
        f.seconds = v[0];
        if let Some(&ms) = v.get(1) {
            f.ms = ms;
        }
    })
}

fn set_milliseconds(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    setter(interp, this, args, "setMilliseconds", false, |f, v| f.ms = v[0])
}

// Parsing

/// Date-time string format of ECMA-262 (`YYYY-MM-DDTHH:mm:ss.sssZ` and
/// its truncations). Date-only forms are UTC; date-time forms without an
/// offset are local time, which is UTC here too.
fn parse_iso(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut pos = 0;

    let number = |pos: &mut usize, digits: usize| -> Option<f64> {
        let text = s.get(*pos..*pos + digits)?;
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *pos += digits;
        text.parse::<f64>().ok()
    };
    let expect = |pos: &mut usize, c: u8| -> bool {
        if bytes.get(*pos) == Some(&c) {
            *pos += 1;
            true
        } else {
            false
        }
    };

    let year = match bytes.first()? {
        b'+' | b'-' => {
            let negative = bytes[0] == b'-';
            pos = 1;
            let year = number(&mut pos, 6)?;
            if negative && year == 0.0 {
                return None;
            }
            if negative { -year } else { year }
        }
        _ => number(&mut pos, 4)?,
    };
    let (mut month, mut day) = (1.0, 1.0);
    if expect(&mut pos, b'-') {
        month = number(&mut pos, 2)?;
        if expect(&mut pos, b'-') {
            day = number(&mut pos, 2)?;
        }
    }
    if !(1.0..=12.0).contains(&month) || !(1.0..=31.0).contains(&day) {
        return None;
    }

    let (mut hours, mut minutes, mut seconds, mut ms) = (0.0, 0.0, 0.0, 0.0);
    let mut offset_minutes = 0.0;
    if expect(&mut pos, b'T') || expect(&mut pos, b' ') {
        hours = number(&mut pos, 2)?;
        if !expect(&mut pos, b':') {
            return None;
        }
        minutes = number(&mut pos, 2)?;
        if expect(&mut pos, b':') {
            seconds = number(&mut pos, 2)?;
            if expect(&mut pos, b'.') {
                let start = pos;
                while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                    pos += 1;
                }
                let fraction = s.get(start..pos).filter(|f| !f.is_empty())?;
                let padded = format!("{fraction:0<3}");
                ms = padded[..3].parse().ok()?;
            }
        }
        if hours > 24.0 || minutes > 59.0 || seconds > 59.0 {
            return None;
        }
        if hours == 24.0 && (minutes != 0.0 || seconds != 0.0 || ms != 0.0) {
            return None;
        }
        match bytes.get(pos).copied() {
            Some(b'Z') => pos += 1,
            Some(sign @ (b'+' | b'-')) => {
                pos += 1;
                let oh = number(&mut pos, 2)?;
                expect(&mut pos, b':');
                let om = number(&mut pos, 2)?;
                let total = oh * 60.0 + om;
                offset_minutes = if sign == b'+' { total } else { -total };
            }
            _ => {}
        }
    }
    if pos != bytes.len() {
        return None;
    }
    let time = make_date(
        make_day(year, month - 1.0, day),
        make_time(hours, minutes, seconds, ms),
    );
    Some(time - offset_minutes * 60_000.0)
}

/// Formats other than the ISO one: `toString`/`toUTCString` output, RFC
/// 2822 and a few common US forms.
fn parse_fallback(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = match s.find(" (") {
        Some(paren) => &s[..paren],
        None => s,
    };
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    for format in ["%a %b %d %Y %H:%M:%S GMT%z", "%b %d %Y %H:%M:%S GMT%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.timestamp_millis() as f64);
        }
    }
    let s = s.strip_suffix(" GMT").or_else(|| s.strip_suffix(" UTC")).unwrap_or(s);
    const DATE_TIMES: [&str; 6] = [
        "%a, %d %b %Y %H:%M:%S",
        "%a %b %d %Y %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%B %d, %Y %H:%M:%S",
        "%b %d, %Y %H:%M:%S",
    ];
    for format in DATE_TIMES {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis() as f64);
        }
    }
    const DATES: [&str; 7] = [
        "%a %b %d %Y",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
        "%d %b %Y",
    ];
    for format in DATES {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            let days = i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
            return Some(days as f64 * MS_PER_DAY);
        }
    }
    None
}

/// `Date.parse` semantics; NaN when unrecognised.
pub(crate) fn parse_date(s: &str) -> f64 {
    time_clip(parse_iso(s.trim()).or_else(|| parse_fallback(s)).unwrap_or(f64::NAN))
}

// Constructor and statics

fn date_value(time: f64) -> Value {
    Value::Object(Object::new(ObjectKind::Date(time)))
}

/// Time value from `Date.UTC`-style component arguments.
fn from_components(values: &[f64]) -> f64 {
    let component = |i: usize, default: f64| values.get(i).copied().unwrap_or(default);
    let mut year = component(0, f64::NAN);
    if year.is_finite() {
        let int = year.trunc();
        if (0.0..=99.0).contains(&int) {
            year = 1900.0 + int;
        }
    }
    make_date(
        make_day(year, component(1, 0.0), component(2, 1.0)),
        make_time(
            component(3, 0.0),
            component(4, 0.0),
            component(5, 0.0),
            component(6, 0.0),
        ),
    )
}

/// `new Date(...)`.
pub(crate) fn construct(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let time = match args {
        [] => now(),
        [single] => {
            let existing = single.as_object().and_then(|obj| match obj.borrow().kind {
                ObjectKind::Date(time) => Some(time),
                _ => None,
            });
            match existing {
                Some(time) => time,
                None => match interp.to_primitive(single, crate::interpreter::Hint::Default)? {
                    Value::String(s) => parse_date(&s),
                    other => time_clip(interp.to_number(&other)?),
                },
            }
        }
        _ => time_clip(from_components(&numbers(interp, args)?)),
    };
    Ok(date_value(time))
}

/// `Date(...)` without `new`: the current time as a string.
pub(crate) fn call_constructor(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(to_date_string(now())))
}

pub(crate) fn date_now(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(now()))
}

pub(crate) fn date_parse(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = interp.to_js_string(&arg(args, 0))?;
    Ok(Value::Number(parse_date(&s)))
}

pub(crate) fn date_utc(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    Ok(Value::Number(time_clip(from_components(&values))))
}

#[cfg(test)]
mod tests;
