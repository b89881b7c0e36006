//! Identifier, type, default-expression, and body normalization.
//!
//! Every comparison the differ makes goes through this module rather than
//! scattering `to_lowercase()` calls across handlers, per the design note on
//! identifier normalization.

use crate::model::QualifiedName;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Strip a single layer of double-quoting from an identifier, undoing the
/// `""` escape, and return the exact inner characters. A plain (unquoted)
/// identifier is returned as-is.
pub fn unquote_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Canonical form of an identifier for storage and comparison: unquoted,
/// then lowercased (unless the caller is running in case-sensitive mode,
/// which is handled by [`identifiers_eq_with_case`] rather than here, since
/// storage always lowercases per §3 of the data model).
pub fn normalize_identifier(raw: &str) -> String {
    unquote_identifier(raw).to_lowercase()
}

/// `normalize("x") == normalize("\"x\"") == normalize("X")` — the identifier
/// equality invariant, case-insensitive by default.
pub fn identifiers_eq(a: &str, b: &str) -> bool {
    normalize_identifier(a) == normalize_identifier(b)
}

pub fn identifiers_eq_with_case(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        unquote_identifier(a) == unquote_identifier(b)
    } else {
        identifiers_eq(a, b)
    }
}

pub fn qualified_names_eq(a: &QualifiedName, b: &QualifiedName) -> bool {
    identifiers_eq(&a.schema, &b.schema) && identifiers_eq(&a.name, &b.name)
}

/// Splits `schema.name` (or a bare `name`, defaulted to `default_schema`)
/// into a [`QualifiedName`], unquoting each part and lowercasing per the
/// storage convention. Respects a quoted identifier containing a literal
/// `.`.
pub fn split_qualified_name(raw: &str, default_schema: &str) -> QualifiedName {
    let raw = raw.trim();
    let parts = split_respecting_quotes(raw, '.');
    match parts.as_slice() {
        [name] => QualifiedName::new(default_schema.to_lowercase(), normalize_identifier(name)),
        [schema, name] => QualifiedName::new(normalize_identifier(schema), normalize_identifier(name)),
        _ => {
            // More than one dot (e.g. database.schema.table) — keep the last
            // two parts, which is the (schema, name) pair DDL cares about.
            let len = parts.len();
            QualifiedName::new(
                normalize_identifier(parts[len - 2]),
                normalize_identifier(parts[len - 1]),
            )
        }
    }
}

fn split_respecting_quotes(raw: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let ch = raw[i..].chars().next().unwrap();
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == sep && !in_quotes {
            parts.push(&raw[start..i]);
            start = i + ch.len_utf8();
        }
        i += ch.len_utf8();
    }
    parts.push(&raw[start..]);
    parts
}

/// Canonical type spellings after alias resolution. Keys are uppercase
/// normalized base names (no precision/scale/array suffix).
static TYPE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("INT4", "INTEGER"),
        ("INT", "INTEGER"),
        ("INT8", "BIGINT"),
        ("INT2", "SMALLINT"),
        ("FLOAT8", "DOUBLE PRECISION"),
        ("FLOAT4", "REAL"),
        ("BOOL", "BOOLEAN"),
        ("DECIMAL", "NUMERIC"),
        ("CHARACTER VARYING", "VARCHAR"),
        ("CHARACTER", "CHAR"),
        ("TIMESTAMPTZ", "TIMESTAMP WITH TIME ZONE"),
        ("TIMESTAMP WITHOUT TIME ZONE", "TIMESTAMP"),
        ("TIMETZ", "TIME WITH TIME ZONE"),
        ("TIME WITHOUT TIME ZONE", "TIME"),
        ("SERIAL4", "SERIAL"),
        ("SERIAL8", "BIGSERIAL"),
        ("SERIAL2", "SMALLSERIAL"),
    ]
    .into_iter()
    .collect()
});

/// Canonicalize a base data-type name (already uppercased, no precision
/// suffix) through the alias table. Unknown names pass through unchanged.
pub fn canonical_type_name(base: &str) -> String {
    let upper = base.trim().to_uppercase();
    TYPE_ALIASES.get(upper.as_str()).map(|s| s.to_string()).unwrap_or(upper)
}

/// Collapse runs of whitespace to single spaces and trim the ends. Used
/// before keyword-case normalization for default expressions and bodies.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Uppercase only the keyword-shaped identifier runs of an expression,
/// leaving string/quoted-identifier literals untouched. This is a
/// conservative approximation: it uppercases any run of ASCII letters that
/// is not inside `'...'` or `"..."`.
pub fn uppercase_keywords_outside_literals(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(ch);
            }
            c if !in_single && !in_double && c.is_ascii_alphabetic() => {
                out.push(c.to_ascii_uppercase());
            }
            c => out.push(c),
        }
    }
    out
}

/// Normalize a default expression for comparison: whitespace collapse plus
/// keyword-case uppercasing. No semantic equivalence is applied — `NOW()`
/// and `CURRENT_TIMESTAMP` remain distinct, per spec.
pub fn normalize_default_expr(expr: &str) -> String {
    uppercase_keywords_outside_literals(&collapse_whitespace(expr))
}

/// Strip `--` line comments that are not inside a string literal, used
/// before comparing view/function bodies.
pub fn strip_line_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_single = false;
    let mut chars = input.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch == '\'' {
            in_single = !in_single;
            out.push(ch);
            continue;
        }
        if !in_single && ch == '-' {
            if let Some(&(_, '-')) = chars.peek() {
                // consume until newline (exclusive) so the newline itself
                // still separates tokens on the next line
                while let Some(&(_, next)) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Normalize a view/materialized-view/function body for comparison:
/// `--`-comment stripping, whitespace collapse, keyword uppercasing, and
/// trailing-semicolon trim.
pub fn normalize_body(body: &str) -> String {
    let stripped = strip_line_comments(body);
    let collapsed = collapse_whitespace(&stripped);
    let upper = uppercase_keywords_outside_literals(&collapsed);
    upper.trim_end_matches(';').trim().to_string()
}
