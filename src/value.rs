//! Decoded cell values.

use std::fmt::{self, Write};

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A native leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// Exact decimal, digits preserved as received.
    Decimal(BigDecimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    /// Wall-clock timestamp with no zone.
    Timestamp(NaiveDateTime),
    /// Timestamp interpreted in a named zone.
    TimestampZoned(DateTime<Tz>),
    /// Timestamp with an explicit UTC offset.
    TimestampOffset(DateTime<FixedOffset>),
}

/// A decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(Scalar),
    /// Array of any dimension; inner dimensions are nested sequences.
    Sequence(Vec<Value>),
    /// Fixed arity, heterogeneous.
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Widen any integer scalar to `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            Scalar::Int8(n) => Some(*n as i64),
            Scalar::Int16(n) => Some(*n as i64),
            Scalar::Int32(n) => Some(*n as i64),
            Scalar::Int64(n) => Some(*n),
            Scalar::UInt8(n) => Some(*n as i64),
            Scalar::UInt16(n) => Some(*n as i64),
            Scalar::UInt32(n) => Some(*n as i64),
            Scalar::UInt64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.as_scalar()? {
            Scalar::Float32(n) => Some(*n as f64),
            Scalar::Float64(n) => Some(*n),
            _ => self.as_i64().map(|n| n as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_scalar()? {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Scalar(Scalar::String(s)) if nested => {
                // escaped like string literals
                f.write_char('\'')?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        _ => f.write_char(c)?,
                    }
                }
                f.write_char('\'')
            }
            Value::Scalar(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    v.fmt_nested(f, true)?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    v.fmt_nested(f, true)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int8(n) => write!(f, "{}", n),
            Scalar::Int16(n) => write!(f, "{}", n),
            Scalar::Int32(n) => write!(f, "{}", n),
            Scalar::Int64(n) => write!(f, "{}", n),
            Scalar::UInt8(n) => write!(f, "{}", n),
            Scalar::UInt16(n) => write!(f, "{}", n),
            Scalar::UInt32(n) => write!(f, "{}", n),
            Scalar::UInt64(n) => write!(f, "{}", n),
            Scalar::Float32(n) => write!(f, "{}", n),
            Scalar::Float64(n) => write!(f, "{}", n),
            Scalar::Decimal(d) => write!(f, "{}", d),
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Bytes(bytes) => write!(f, "\\x{}", hex::encode(bytes)),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Scalar::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Scalar::TimestampZoned(ts) => {
                write!(f, "{} {}", ts.format("%Y-%m-%d %H:%M:%S%.f"), ts.timezone().name())
            }
            Scalar::TimestampOffset(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f%:z")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int8(n) => serializer.serialize_i8(*n),
            Scalar::Int16(n) => serializer.serialize_i16(*n),
            Scalar::Int32(n) => serializer.serialize_i32(*n),
            Scalar::Int64(n) => serializer.serialize_i64(*n),
            Scalar::UInt8(n) => serializer.serialize_u8(*n),
            Scalar::UInt16(n) => serializer.serialize_u16(*n),
            Scalar::UInt32(n) => serializer.serialize_u32(*n),
            Scalar::UInt64(n) => serializer.serialize_u64(*n),
            Scalar::Float32(n) => serializer.serialize_f32(*n),
            Scalar::Float64(n) => serializer.serialize_f64(*n),
            Scalar::String(s) => serializer.serialize_str(s),
            // exact digits, not a JSON float
            other => serializer.collect_str(other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::Sequence(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    BigDecimal => Decimal,
    String => String,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    DateTime<Tz> => TimestampZoned,
    DateTime<FixedOffset> => TimestampOffset,
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}
