//! SQL literal encoder.
//!
//! Turns native values into literal text for splicing into query text.
//! The string escaping here is the only thing standing between a parameter
//! value and the surrounding SQL, so every string-bearing leaf goes through
//! [`LiteralWriter::push_quoted`], at any nesting level.
//!
//! Literal rules:
//! - NULL: `\N`
//! - Boolean: `1` or `0`
//! - Numeric: plain digits, never scientific notation
//! - String: `'...'` with `\` → `\\` and `'` → `\'`
//! - Date/timestamp: quoted, fractional seconds only when non-zero
//! - Array: `[a,b,...]`, tuple: `(a,b,...)`

use std::any::Any;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::decode::NULL_SENTINEL;
use crate::error::{CodecError, CodecResult};
use crate::types::DEFAULT_MAX_DEPTH;
use crate::value::{Scalar, Value};

/// Output buffer plus nesting bookkeeping.
#[derive(Debug)]
pub struct LiteralWriter {
    out: String,
    depth: usize,
    max_depth: usize,
}

impl LiteralWriter {
    pub fn new(max_depth: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn push_null(&mut self) {
        self.out.push_str(NULL_SENTINEL);
    }

    /// Append unquoted text. Callers must only pass text that cannot end
    /// the literal context (digits, signs, dots).
    fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Append `text` as a single-quoted, escaped string literal.
    pub fn push_quoted(&mut self, text: &str) -> CodecResult<()> {
        if text.contains('\0') {
            return Err(CodecError::malformed("String", "embedded NUL character"));
        }
        self.out.reserve(text.len() + 2);
        self.out.push('\'');
        for c in text.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '\'' => self.out.push_str("\\'"),
                _ => self.out.push(c),
            }
        }
        self.out.push('\'');
        Ok(())
    }

    /// Write `items` between `open` and `close`, comma separated, one level
    /// deeper.
    fn push_list<'a, T, I>(&mut self, open: char, close: char, items: I) -> CodecResult<()>
    where
        T: ToLiteral + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        self.out.push(open);
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            item.write_literal(self)?;
        }
        self.out.push(close);
        self.depth -= 1;
        Ok(())
    }
}

/// Types that can be written as a SQL literal.
pub trait ToLiteral {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()>;
}

/// Encode a value as SQL literal text.
///
/// ```
/// use sqlcell::encode;
///
/// assert_eq!(encode("105' OR 1=1--'").unwrap(), r"'105\' OR 1=1--\''");
/// assert_eq!(encode(&vec![vec!["a", "b"], vec!["c"]]).unwrap(), "[['a','b'],['c']]");
/// ```
pub fn encode<T: ToLiteral + ?Sized>(value: &T) -> CodecResult<String> {
    encode_with_depth(value, DEFAULT_MAX_DEPTH)
}

pub fn encode_with_depth<T: ToLiteral + ?Sized>(value: &T, max_depth: usize) -> CodecResult<String> {
    let mut w = LiteralWriter::new(max_depth);
    value.write_literal(&mut w)?;
    Ok(w.finish())
}

impl<T: ToLiteral + ?Sized> ToLiteral for &T {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        (**self).write_literal(w)
    }
}

impl<T: ToLiteral + ?Sized> ToLiteral for Box<T> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        (**self).write_literal(w)
    }
}

impl ToLiteral for bool {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_raw(if *self { "1" } else { "0" });
        Ok(())
    }
}

macro_rules! integer_literal {
    ($($ty:ty),*) => {
        $(
            impl ToLiteral for $ty {
                fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
                    w.push_raw(&self.to_string());
                    Ok(())
                }
            }
        )*
    };
}

integer_literal!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_literal {
    ($($ty:ty),*) => {
        $(
            impl ToLiteral for $ty {
                fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
                    if self.is_nan() {
                        w.push_quoted("NaN")
                    } else if self.is_infinite() {
                        w.push_quoted(if self.is_sign_positive() { "inf" } else { "-inf" })
                    } else {
                        // Display never uses exponent notation
                        w.push_raw(&self.to_string());
                        Ok(())
                    }
                }
            }
        )*
    };
}

float_literal!(f32, f64);

impl ToLiteral for BigDecimal {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_raw(&plain_decimal(self));
        Ok(())
    }
}

/// Positional notation for any scale, e.g. `1E+3` → `1000`, `-5E-3` → `-0.005`.
fn plain_decimal(d: &BigDecimal) -> String {
    let (int, scale) = d.as_bigint_and_exponent();
    let text = int.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };

    let body = if scale <= 0 {
        format!("{}{}", digits, "0".repeat(scale.unsigned_abs() as usize))
    } else {
        let scale = scale as usize;
        if digits.len() > scale {
            let (whole, frac) = digits.split_at(digits.len() - scale);
            format!("{}.{}", whole, frac)
        } else {
            format!("0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    };
    format!("{}{}", sign, body)
}

impl ToLiteral for str {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(self)
    }
}

impl ToLiteral for String {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(self)
    }
}

impl ToLiteral for char {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(self.encode_utf8(&mut [0u8; 4]))
    }
}

impl ToLiteral for NaiveDate {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(&self.format("%Y-%m-%d").to_string())
    }
}

/// `yyyy-MM-dd HH:mm:ss[.ffffff|.fffffffff]`
fn timestamp_text(ts: &NaiveDateTime) -> String {
    let mut text = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = if nanos % 1_000 == 0 {
            format!(".{:06}", nanos / 1_000)
        } else {
            format!(".{:09}", nanos)
        };
        text.push_str(&fraction);
    }
    text
}

impl ToLiteral for NaiveDateTime {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(&timestamp_text(self))
    }
}

impl ToLiteral for DateTime<Tz> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(&timestamp_text(&self.naive_local()))
    }
}

impl ToLiteral for DateTime<Utc> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_quoted(&timestamp_text(&self.naive_utc()))
    }
}

impl ToLiteral for DateTime<FixedOffset> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        let text = format!("{}{}", timestamp_text(&self.naive_local()), self.format("%:z"));
        w.push_quoted(&text)
    }
}

impl<T: ToLiteral> ToLiteral for Option<T> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        match self {
            Some(v) => v.write_literal(w),
            None => {
                w.push_null();
                Ok(())
            }
        }
    }
}

impl<T: ToLiteral> ToLiteral for [T] {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_list('[', ']', self)
    }
}

impl<T: ToLiteral, const N: usize> ToLiteral for [T; N] {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_list('[', ']', self)
    }
}

impl<T: ToLiteral> ToLiteral for Vec<T> {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        w.push_list('[', ']', self)
    }
}

impl ToLiteral for Scalar {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        match self {
            Scalar::Bool(b) => b.write_literal(w),
            Scalar::Int8(n) => n.write_literal(w),
            Scalar::Int16(n) => n.write_literal(w),
            Scalar::Int32(n) => n.write_literal(w),
            Scalar::Int64(n) => n.write_literal(w),
            Scalar::UInt8(n) => n.write_literal(w),
            Scalar::UInt16(n) => n.write_literal(w),
            Scalar::UInt32(n) => n.write_literal(w),
            Scalar::UInt64(n) => n.write_literal(w),
            Scalar::Float32(n) => n.write_literal(w),
            Scalar::Float64(n) => n.write_literal(w),
            Scalar::Decimal(d) => d.write_literal(w),
            Scalar::String(s) => w.push_quoted(s),
            Scalar::Bytes(bytes) => w.push_quoted(&format!("\\x{}", hex::encode(bytes))),
            Scalar::Date(d) => d.write_literal(w),
            Scalar::Timestamp(ts) => ts.write_literal(w),
            Scalar::TimestampZoned(ts) => ts.write_literal(w),
            Scalar::TimestampOffset(ts) => ts.write_literal(w),
        }
    }
}

impl ToLiteral for Value {
    fn write_literal(&self, w: &mut LiteralWriter) -> CodecResult<()> {
        match self {
            Value::Null => {
                w.push_null();
                Ok(())
            }
            Value::Scalar(s) => s.write_literal(w),
            Value::Sequence(items) => w.push_list('[', ']', items),
            Value::Tuple(items) => w.push_list('(', ')', items),
        }
    }
}

/// A type-erased parameter, as held by statement wrappers that accept
/// heterogeneous bind values.
pub type AnyParam = Box<dyn Any + Send + Sync>;

/// Encode a type-erased value by probing its runtime type.
///
/// Types outside the supported set fail with
/// [`CodecError::UnsupportedEncodingType`].
pub fn encode_any(value: &dyn Any) -> CodecResult<String> {
    let mut w = LiteralWriter::new(DEFAULT_MAX_DEPTH);
    write_any(value, &mut w)?;
    Ok(w.finish())
}

macro_rules! probe {
    ($value:expr, $w:expr; $($ty:ty),* $(,)?) => {
        $(
            if let Some(v) = $value.downcast_ref::<$ty>() {
                return v.write_literal($w);
            }
            if let Some(v) = $value.downcast_ref::<Option<$ty>>() {
                return v.write_literal($w);
            }
            if let Some(v) = $value.downcast_ref::<Vec<$ty>>() {
                return v.write_literal($w);
            }
        )*
    };
}

fn write_any(value: &dyn Any, w: &mut LiteralWriter) -> CodecResult<()> {
    probe!(value, w;
        bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
        f32, f64, BigDecimal, String, &'static str, char,
        NaiveDate, NaiveDateTime, DateTime<Tz>, DateTime<Utc>, DateTime<FixedOffset>,
        Scalar, Value,
    );
    if let Some(items) = value.downcast_ref::<Vec<AnyParam>>() {
        if w.depth >= w.max_depth {
            return Err(CodecError::DepthExceeded { limit: w.max_depth });
        }
        w.depth += 1;
        w.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                w.out.push(',');
            }
            write_any(&**item, w)?;
        }
        w.out.push(']');
        w.depth -= 1;
        return Ok(());
    }
    Err(CodecError::UnsupportedEncodingType(format!("{:?}", value.type_id())))
}
