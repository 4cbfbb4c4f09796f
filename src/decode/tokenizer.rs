//! Quote- and paren-aware splitting of container cell text.
//!
//! Separator validity depends on two pieces of state at once (inside a quoted
//! string, and nesting depth), so this is a single hand-rolled scan rather
//! than a regex.

/// Split `text` on top-level commas.
///
/// A `'` toggles the quoted state unless it is escaped with a backslash.
/// When `child_is_tuple` is set, `(`/`)` and `[`/`]` outside quotes adjust
/// the nesting depth, and commas only split at depth zero.
///
/// Every delimiter produces a segment, empty ones included, and the trailing
/// segment is always emitted, so the result is never empty. Unbalanced input
/// is split as far as it goes.
pub fn split(text: &str, child_is_tuple: bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' => in_quote = !in_quote,
            '(' | '[' if child_is_tuple && !in_quote => depth += 1,
            ')' | ']' if child_is_tuple && !in_quote => depth = depth.saturating_sub(1),
            ',' if depth == 0 && !in_quote => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Split the inside of a `dims`-dimensional array (outer brackets already
/// removed) into its `dims - 1`-dimensional sub-arrays.
///
/// The boundary is `]` × (dims-1), `,`, `[` × (dims-1); matches inside quoted
/// strings or inside a parenthesized tuple element are skipped. The brackets
/// forming the boundary are consumed.
pub fn split_dimension(text: &str, dims: usize) -> Vec<&str> {
    if dims <= 1 {
        return vec![text];
    }
    let run = dims - 1;
    let boundary = format!("{},{}", "]".repeat(run), "[".repeat(run));

    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut parens = 0usize;
    let mut start = 0;
    let mut skip_until = 0;

    for (i, c) in text.char_indices() {
        if i < skip_until {
            continue;
        }
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => parens += 1,
            ')' if !in_quote => parens = parens.saturating_sub(1),
            ']' if !in_quote && parens == 0 && text[i..].starts_with(&boundary) => {
                parts.push(&text[start..i]);
                start = i + boundary.len();
                skip_until = start;
            }
            _ => {}
        }
    }
    parts.push(&text[start.min(text.len())..]);
    parts
}

/// Remove one layer of surrounding single quotes and unescape `\'` and `\\`.
///
/// Text that is not quoted on both ends is returned unchanged.
pub fn unquote(segment: &str) -> std::borrow::Cow<'_, str> {
    use std::borrow::Cow;

    let inner = match segment
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        Some(inner) if segment.len() >= 2 => inner,
        _ => return Cow::Borrowed(segment),
    };
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\'' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_split() {
        assert_eq!(split("1,2,3", false), vec!["1", "2", "3"]);
        assert_eq!(split("", false), vec![""]);
        assert_eq!(split("1,,3,", false), vec!["1", "", "3", ""]);
    }

    #[test]
    fn test_comma_inside_quotes() {
        assert_eq!(split("'1','2,','3'", false), vec!["'1'", "'2,'", "'3'"]);
    }

    #[test]
    fn test_escaped_quote_does_not_toggle() {
        assert_eq!(split(r"'it\'s,ok',x", false), vec![r"'it\'s,ok'", "x"]);
    }

    #[test]
    fn test_tuple_depth() {
        assert_eq!(
            split("(1,'a'),(2,'b')", true),
            vec!["(1,'a')", "(2,'b')"]
        );
        // parens are not tracked for scalar children
        assert_eq!(split("(1,2)", false), vec!["(1", "2)"]);
    }

    #[test]
    fn test_parens_inside_quotes_ignored() {
        assert_eq!(
            split("(1,'(a))'),(2,'[b]')", true),
            vec!["(1,'(a))')", "(2,'[b]')"]
        );
    }

    #[test]
    fn test_unbalanced_never_panics() {
        assert_eq!(split("(1,2", true), vec!["(1,2"]);
        assert_eq!(split("1),2", true), vec!["1)", "2"]);
        assert_eq!(split("'open,2", false), vec!["'open,2"]);
    }

    #[test]
    fn test_split_dimension() {
        assert_eq!(split_dimension("1,2],[3", 2), vec!["1,2", "3"]);
        assert_eq!(
            split_dimension("1],[2]],[[3],[4", 3),
            vec!["1],[2", "3],[4"]
        );
        assert_eq!(split_dimension("'a],[b'],['c'", 2), vec!["'a],[b'", "'c'"]);
        assert_eq!(split_dimension("", 2), vec![""]);
    }

    #[test]
    fn test_split_dimension_skips_tuple_fields() {
        assert_eq!(split_dimension("([1],[2])", 2), vec!["([1],[2])"]);
        assert_eq!(
            split_dimension("([1],[2])],[([3],[4])", 2),
            vec!["([1],[2])", "([3],[4])"]
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("abc"), "abc");
        assert_eq!(unquote("'"), "'");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote(r"'a\\b'"), r"a\b");
        assert_eq!(unquote(r"'\n'"), r"\n");
    }
}
