//! Cell text → [`Value`] decoding.
//!
//! All functions are pure and synchronous; a [`Type`] is only read, so one
//! parsed type can be shared by any number of threads decoding rows.

pub mod array;
pub mod convert;
pub mod tokenizer;

use chrono_tz::Tz;

pub use convert::NULL_SENTINEL;

use crate::error::CodecResult;
use crate::types::{DEFAULT_MAX_DEPTH, Type};
use crate::value::Value;

/// Settings that affect decoding but are not part of a column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Zone for sub-second timestamps whose type declares none.
    pub default_timezone: Tz,
    /// Maximum container nesting.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            default_timezone: chrono_tz::UTC,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decode one cell against its column type.
pub fn decode_cell(text: &str, ty: &Type, options: &DecodeOptions) -> CodecResult<Value> {
    match ty {
        Type::Scalar(scalar) => convert::convert(text, scalar, options),
        _ if text == NULL_SENTINEL => Ok(Value::Null),
        _ => array::decode_container(text, ty, options),
    }
}

/// [`decode_cell`] with default options.
///
/// ```
/// use sqlcell::{decode, parse_type, Value};
///
/// let ty = parse_type("Array(Nullable(Int32))");
/// let v = decode("[1,\\N]", &ty).unwrap();
/// assert_eq!(v, Value::Sequence(vec![Value::from(1i32), Value::Null]));
/// ```
pub fn decode(text: &str, ty: &Type) -> CodecResult<Value> {
    decode_cell(text, ty, &DecodeOptions::default())
}
