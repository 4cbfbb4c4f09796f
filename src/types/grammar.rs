//! Type grammar parser.
//!
//! ```text
//! type   := ["NULLABLE("] (leaf | array | tuple) [")"]
//! array  := "ARRAY(" type ")"
//! tuple  := "TUPLE(" type {"," type} ")"
//! leaf   := NAME ["(" arg {"," arg} ")"]
//! ```
//!
//! Parsing never fails. Unknown leaf keywords become [`Kind::Unknown`],
//! unrecognized timezone arguments are dropped, and subtrees nested deeper
//! than the depth cap are replaced by `Unknown`.

use chrono_tz::Tz;
use nom::{
    IResult, Parser,
    bytes::complete::take_while,
    character::complete::char,
    multi::separated_list0,
    sequence::delimited,
};
use tracing::{debug, warn};

use super::{DEFAULT_MAX_DEPTH, Kind, ScalarType, Type};
use crate::decode::tokenizer;

/// Parse a column type descriptor with the default depth cap.
///
/// # Example
///
/// ```
/// use sqlcell::types::{parse_type, Kind, Type};
///
/// let ty = parse_type("Nullable(Int32)");
/// assert_eq!(ty, Type::scalar(Kind::Int32).into_nullable());
/// ```
pub fn parse_type(text: &str) -> Type {
    parse_type_with_depth(text, DEFAULT_MAX_DEPTH)
}

/// Parse a column type descriptor, degrading composite levels beyond
/// `max_depth` to `Unknown`.
pub fn parse_type_with_depth(text: &str, max_depth: usize) -> Type {
    parse_at(text, 0, max_depth)
}

fn parse_at(text: &str, depth: usize, max_depth: usize) -> Type {
    let text = text.trim();

    // every wrapper level counts against the cap, Nullable included
    if let Some(body) = wrapped_body(text, "NULLABLE") {
        if depth >= max_depth {
            return too_deep(max_depth).into_nullable();
        }
        return parse_at(body, depth + 1, max_depth).into_nullable();
    }

    if let Some(body) = wrapped_body(text, "ARRAY") {
        if depth >= max_depth {
            return too_deep(max_depth);
        }
        return Type::array(parse_at(body, depth + 1, max_depth));
    }

    if let Some(body) = wrapped_body(text, "TUPLE") {
        if depth >= max_depth {
            return too_deep(max_depth);
        }
        let elements = tokenizer::split(body, true)
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(|part| parse_at(part, depth + 1, max_depth))
            .collect();
        return Type::tuple(elements);
    }

    Type::Scalar(parse_leaf(text))
}

fn too_deep(limit: usize) -> Type {
    warn!(limit, "type nesting too deep, degrading to Unknown");
    Type::scalar(Kind::Unknown)
}

/// If `text` is `KEYWORD(...)`, return the text between the parens.
///
/// An unterminated body runs to the end of the input.
fn wrapped_body<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = text[keyword.len()..].trim_start();
    let inner = rest.strip_prefix('(')?;
    match matching_close(inner) {
        Some(end) => {
            if !inner[end + 1..].trim().is_empty() {
                debug!(text, "ignoring trailing text after {}(...)", keyword);
            }
            Some(&inner[..end])
        }
        None => {
            warn!(text, "unbalanced parentheses in type");
            Some(inner)
        }
    }
}

/// Byte offset of the `)` closing an already-opened paren. Quote aware.
fn matching_close(inner: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

fn parse_leaf(text: &str) -> ScalarType {
    let (name, args_text) = match text.find('(') {
        Some(pos) => (&text[..pos], Some(&text[pos..])),
        None => (text, None),
    };

    let kind = Kind::from_alias(name).unwrap_or_else(|| {
        warn!(type_name = name.trim(), "unknown column type, decoding as text");
        Kind::Unknown
    });
    let mut scalar = ScalarType::new(kind);

    let Some(args_text) = args_text else {
        return scalar;
    };
    let args = match leaf_args(args_text) {
        Ok((_, args)) => args,
        Err(e) => {
            debug!(text, error = ?e, "malformed type arguments ignored");
            return scalar;
        }
    };
    apply_args(&mut scalar, &args);
    scalar
}

/// `(arg, arg, ...)` with raw (untrimmed) argument slices.
fn leaf_args(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        char('('),
        separated_list0(char(','), take_while(|c: char| c != ',' && c != ')')),
        char(')'),
    )
    .parse(input)
}

fn apply_args(scalar: &mut ScalarType, args: &[&str]) {
    let numbers: Vec<Option<u32>> = args.iter().map(|a| a.trim().parse().ok()).collect();

    match (scalar.kind, args) {
        (Kind::Decimal, _) => {
            if let Some(Some(p)) = numbers.first() {
                scalar.precision = *p;
            }
            if let Some(Some(s)) = numbers.get(1) {
                scalar.scale = *s;
            }
        }
        (_, [single]) if numbers[0].is_none() => {
            scalar.timezone = resolve_timezone(scalar.kind, single);
        }
        (Kind::DateTime64, [scale, rest @ ..]) => {
            if let Some(s) = numbers[0] {
                scalar.scale = s;
            } else {
                debug!(arg = scale.trim(), "non-numeric timestamp scale ignored");
            }
            if let Some(zone) = rest.first() {
                scalar.timezone = resolve_timezone(scalar.kind, zone);
            }
        }
        _ => debug!(kind = %scalar.kind, ?args, "type arguments ignored"),
    }
}

/// Strip quotes (including escaped `\'` markers) and look up the zone id.
fn resolve_timezone(kind: Kind, raw: &str) -> Option<Tz> {
    let cleaned = raw.trim().replace("\\'", "'");
    let zone = cleaned.trim_matches(|c| c == '\'' || c == '"').trim();

    if !kind.accepts_timezone() {
        debug!(%kind, zone, "timezone argument ignored for kind");
        return None;
    }
    match zone.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            warn!(zone, "unrecognized timezone in column type, ignoring");
            None
        }
    }
}
