//! Leaf conversion: one cell (or array element) of text into a [`Scalar`].

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use super::DecodeOptions;
use crate::error::{CodecError, CodecResult};
use crate::types::{Kind, ScalarType};
use crate::value::{Scalar, Value};

/// Null sentinel of the tabular wire format.
pub const NULL_SENTINEL: &str = "\\N";

const DATE_FORMAT: &str = "%Y-%m-%d";
const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Fractional seconds are normalized to nanoseconds.
const FRACTION_WIDTH: usize = 9;

/// Convert cell text for a leaf type.
///
/// `\N` is null for every kind. All other failures carry the declared type
/// and the raw text.
pub fn convert(text: &str, ty: &ScalarType, options: &DecodeOptions) -> CodecResult<Value> {
    if text == NULL_SENTINEL {
        return Ok(Value::Null);
    }
    let fail = |reason: String| CodecError::conversion(ty.to_string(), text, reason);

    let scalar = match ty.kind {
        Kind::Null => return Ok(Value::Null),
        Kind::Int8 => Scalar::Int8(parse_num(text).map_err(fail)?),
        Kind::Int16 => Scalar::Int16(parse_num(text).map_err(fail)?),
        Kind::Int32 => Scalar::Int32(parse_num(text).map_err(fail)?),
        Kind::Int64 => Scalar::Int64(parse_num(text).map_err(fail)?),
        Kind::UInt8 => Scalar::UInt8(parse_num(text).map_err(fail)?),
        Kind::UInt16 => Scalar::UInt16(parse_num(text).map_err(fail)?),
        Kind::UInt32 => Scalar::UInt32(parse_num(text).map_err(fail)?),
        Kind::UInt64 => Scalar::UInt64(parse_num(text).map_err(fail)?),
        Kind::Float32 => Scalar::Float32(parse_float::<f32>(text, f32::NAN).map_err(fail)?),
        Kind::Float64 => Scalar::Float64(parse_float::<f64>(text, f64::NAN).map_err(fail)?),
        Kind::Boolean => Scalar::Bool(text != "0"),
        Kind::Decimal => Scalar::Decimal(parse_num::<BigDecimal>(text).map_err(fail)?),
        Kind::String | Kind::Unknown => Scalar::String(text.to_string()),
        Kind::Bytea => Scalar::Bytes(parse_bytea(text).map_err(fail)?),
        Kind::Date => Scalar::Date(
            NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| fail(e.to_string()))?,
        ),
        Kind::DateTime => Scalar::Timestamp(parse_whole_second(text).map_err(fail)?),
        Kind::DateTime64 => {
            let naive = parse_timestamp(text).map_err(fail)?;
            let tz = ty.timezone.unwrap_or(options.default_timezone);
            let zoned = localize(&tz, &naive).map_err(fail)?;
            Scalar::TimestampZoned(zoned)
        }
        Kind::TimestampTz => Scalar::TimestampOffset(parse_timestamp_offset(text).map_err(fail)?),
    };
    Ok(Value::Scalar(scalar))
}

fn parse_num<T>(text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.parse::<T>().map_err(|e| e.to_string())
}

fn parse_float<T>(text: &str, nan: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if text.eq_ignore_ascii_case("nan") {
        return Ok(nan);
    }
    parse_num(text)
}

fn parse_bytea(text: &str) -> Result<Vec<u8>, String> {
    let digits = text
        .strip_prefix("\\x")
        .ok_or_else(|| "expected \\x prefix".to_string())?;
    hex::decode(digits).map_err(|e| e.to_string())
}

/// `yyyy-MM-dd HH:mm:ss`, or `yyyy-MM-dd HH:mm` with seconds defaulted.
fn parse_whole_second(text: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, WHOLE_SECOND_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, MINUTE_FORMAT))
        .map_err(|e| e.to_string())
}

/// Timestamp with optional fractional seconds.
///
/// A `.` after the seconds selects the sub-second form: it must be followed
/// by at least one digit and nothing but digits. Digits are right-padded with
/// zeros to nanoseconds; digits past the ninth are truncated. Text without a
/// `.` falls back to the whole-second and minute forms.
pub(crate) fn parse_timestamp(text: &str) -> Result<NaiveDateTime, String> {
    let Some((whole, fraction)) = text.split_once('.') else {
        return parse_whole_second(text);
    };
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid fractional seconds '{}'", fraction));
    }
    let digits = &fraction[..fraction.len().min(FRACTION_WIDTH)];
    let nanos: u32 = format!("{:0<width$}", digits, width = FRACTION_WIDTH)
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;

    let base = NaiveDateTime::parse_from_str(whole, WHOLE_SECOND_FORMAT).map_err(|e| e.to_string())?;
    base.with_nanosecond(nanos)
        .ok_or_else(|| format!("nanosecond value {} out of range", nanos))
}

fn localize<Z: TimeZone>(tz: &Z, naive: &NaiveDateTime) -> Result<DateTime<Z>, String> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt),
        // repeated wall-clock hour: take the earlier instant
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(format!("{} does not exist in the target zone", naive)),
    }
}

/// `<timestamp>` followed by `Z`, `+HH`, `+HHMM` or `+HH:MM` (or `-`).
fn parse_timestamp_offset(text: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Some(local) = text.strip_suffix('Z') {
        let offset = FixedOffset::east_opt(0).ok_or("invalid offset")?;
        return localize(&offset, &parse_timestamp(local)?);
    }

    // the date part's dashes end at byte 10
    let split = text
        .char_indices()
        .skip(10)
        .filter(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .last()
        .ok_or_else(|| "missing UTC offset".to_string())?;
    let (local, offset) = text.split_at(split);

    let offset = parse_offset(offset)?;
    localize(&offset, &parse_timestamp(local.trim_end())?)
}

fn parse_offset(text: &str) -> Result<FixedOffset, String> {
    let bad = || format!("invalid UTC offset '{}'", text);
    let (sign, digits) = match text.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return Err(bad()),
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let (hours, minutes) = match digits.len() {
        2 => (&digits[..2], "0"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(bad()),
    };
    let hours: i32 = hours.parse().map_err(|_| bad())?;
    let minutes: i32 = minutes.parse().map_err(|_| bad())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}
