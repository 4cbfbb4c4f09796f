//! Multi-dimensional arrays and tuples.
//!
//! Cell grammar: `"[" * d  elements  "]" * d`, where elements are comma
//! separated and may be quoted strings, `NULL`, or parenthesized tuples.

use super::DecodeOptions;
use super::convert::{NULL_SENTINEL, convert};
use super::tokenizer::{split, split_dimension, unquote};
use crate::error::{CodecError, CodecResult};
use crate::types::{Kind, ScalarType, Type};
use crate::value::{Scalar, Value};

/// Unquoted null token inside containers.
const NULL_TOKEN: &str = "NULL";

/// Decode the text of an `Array` or `Tuple` cell.
pub fn decode_container(text: &str, ty: &Type, options: &DecodeOptions) -> CodecResult<Value> {
    decode_at(text.trim(), ty, options, 0)
}

fn decode_at(text: &str, ty: &Type, options: &DecodeOptions, depth: usize) -> CodecResult<Value> {
    if depth >= options.max_depth {
        return Err(CodecError::DepthExceeded {
            limit: options.max_depth,
        });
    }
    match ty {
        Type::Array { .. } => decode_array(text, ty, options, depth),
        Type::Tuple { .. } => decode_tuple(text, ty, options, depth),
        Type::Scalar(s) => convert(text, s, options),
    }
}

fn decode_array(text: &str, ty: &Type, options: &DecodeOptions, depth: usize) -> CodecResult<Value> {
    let dims = text.bytes().take_while(|b| *b == b'[').count();
    let fail = |reason: &str| CodecError::conversion(ty.to_string(), text, reason);

    if dims == 0 {
        return Err(fail("expected '['"));
    }
    if depth + dims > options.max_depth {
        return Err(CodecError::DepthExceeded {
            limit: options.max_depth,
        });
    }
    if dims > ty.array_depth() {
        return Err(fail("more array dimensions than declared"));
    }
    // the wire format has balanced single runs at both ends
    let inner = text
        .get(dims..text.len().saturating_sub(dims))
        .ok_or_else(|| fail("unbalanced brackets"))?;

    decode_dims(inner, dims, ty, options, depth)
}

/// `inner` is the content of a `dims`-dimensional array whose brackets have
/// been removed; `ty` is the array type at this level.
fn decode_dims(
    inner: &str,
    dims: usize,
    ty: &Type,
    options: &DecodeOptions,
    depth: usize,
) -> CodecResult<Value> {
    let Type::Array { element, .. } = ty else {
        return Err(CodecError::conversion(
            ty.to_string(),
            inner,
            "expected an array type",
        ));
    };

    if dims > 1 {
        let items = split_dimension(inner, dims)
            .into_iter()
            .map(|part| decode_dims(part, dims - 1, element, options, depth + 1))
            .collect::<CodecResult<Vec<_>>>()?;
        return Ok(Value::Sequence(items));
    }

    let mut items = Vec::new();
    for segment in split(inner, element.is_tuple()) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        items.push(decode_element(segment, element, ty, options, depth + 1)?);
    }
    Ok(Value::Sequence(items))
}

/// One array element or tuple field. `container` is used to tag errors.
fn decode_element(
    segment: &str,
    ty: &Type,
    container: &Type,
    options: &DecodeOptions,
    depth: usize,
) -> CodecResult<Value> {
    if segment == NULL_TOKEN || segment == NULL_SENTINEL {
        return Ok(Value::Null);
    }
    match ty {
        Type::Scalar(s) => decode_leaf(segment, s, options).map_err(|e| e.within(container.to_string())),
        Type::Tuple { .. } => decode_tuple(segment, ty, options, depth),
        Type::Array { .. } => decode_at(segment, ty, options, depth),
    }
}

fn decode_leaf(segment: &str, ty: &ScalarType, options: &DecodeOptions) -> CodecResult<Value> {
    let quoted = segment.len() >= 2 && segment.starts_with('\'') && segment.ends_with('\'');
    let text = unquote(segment);
    // a quoted string is never the null sentinel
    if quoted && matches!(ty.kind, Kind::String | Kind::Unknown) {
        return Ok(Value::Scalar(Scalar::String(text.into_owned())));
    }
    convert(&text, ty, options)
}

fn decode_tuple(text: &str, ty: &Type, options: &DecodeOptions, depth: usize) -> CodecResult<Value> {
    let Type::Tuple { elements, .. } = ty else {
        return Err(CodecError::conversion(ty.to_string(), text, "expected a tuple type"));
    };
    let text = text.trim();
    if text == NULL_TOKEN || text == NULL_SENTINEL {
        return Ok(Value::Null);
    }
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| CodecError::conversion(ty.to_string(), text, "expected '(...)'"))?;

    let fields: Vec<&str> = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split(inner, true)
    };
    if fields.len() != elements.len() {
        return Err(CodecError::conversion(
            ty.to_string(),
            text,
            format!("expected {} fields, got {}", elements.len(), fields.len()),
        ));
    }

    let values = fields
        .iter()
        .zip(elements)
        .map(|(field, field_ty)| decode_element(field.trim(), field_ty, ty, options, depth + 1))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Value::Tuple(values))
}
