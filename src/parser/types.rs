//! Column data-type parsing: base name, precision/scale, array suffix, and
//! the `SERIAL` family's expansion rule.

use crate::lexer::{Token, TokenKind};
use crate::normalize::canonical_type_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialKind {
    Small,
    Regular,
    Big,
}

impl SerialKind {
    pub fn expanded_type(&self) -> &'static str {
        match self {
            SerialKind::Small => "SMALLINT",
            SerialKind::Regular => "INTEGER",
            SerialKind::Big => "BIGINT",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "SMALLSERIAL" | "SERIAL2" => Some(SerialKind::Small),
            "SERIAL" | "SERIAL4" => Some(SerialKind::Regular),
            "BIGSERIAL" | "SERIAL8" => Some(SerialKind::Big),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub base: String,
    pub max_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub is_array: bool,
    pub serial: Option<SerialKind>,
}

/// Multi-word type name prefixes recognized greedily before checking for a
/// precision clause.
const MULTI_WORD_TYPES: &[&[&str]] = &[
    &["DOUBLE", "PRECISION"],
    &["CHARACTER", "VARYING"],
    &["CHARACTER"],
    &["BIT", "VARYING"],
    &["TIMESTAMP", "WITH", "TIME", "ZONE"],
    &["TIMESTAMP", "WITHOUT", "TIME", "ZONE"],
    &["TIME", "WITH", "TIME", "ZONE"],
    &["TIME", "WITHOUT", "TIME", "ZONE"],
];

/// Parses a type beginning at `tokens[from]`. Returns the parsed
/// `TypeInfo` and the index just past the consumed tokens.
pub fn parse_type(tokens: &[Token], from: usize) -> (TypeInfo, usize) {
    let mut i = from;
    let mut name_parts = Vec::new();

    'outer: for candidate in MULTI_WORD_TYPES {
        let mut j = i;
        for word in *candidate {
            match tokens.get(j) {
                Some(t) if t.kind == TokenKind::Keyword && t.text.eq_ignore_ascii_case(word) => {
                    j += 1;
                }
                // allow identifier-lexed words too (TIMESTAMP/TIME are keywords
                // in our set, but be defensive)
                Some(t) if t.text.eq_ignore_ascii_case(word) => j += 1,
                _ => continue 'outer,
            }
        }
        name_parts = candidate.iter().map(|s| s.to_string()).collect();
        i = j;
        break;
    }

    if name_parts.is_empty() {
        if let Some(t) = tokens.get(i) {
            name_parts.push(t.text.to_string());
            i += 1;
        }
    }

    let base_raw = name_parts.join(" ").to_uppercase();
    let serial = SerialKind::from_name(&base_raw);

    let mut max_length = None;
    let mut precision = None;
    let mut scale = None;

    if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LParen) {
        let close = crate::parser::scan::find_matching_close(tokens, i);
        if let Some(close) = close {
            let inner = &tokens[i + 1..close];
            let nums: Vec<i32> = inner
                .iter()
                .filter(|t| t.kind == TokenKind::Number)
                .filter_map(|t| t.text.parse().ok())
                .collect();
            match (&base_raw[..], nums.as_slice()) {
                (b, [p, s]) if b.starts_with("NUMERIC") || b.starts_with("DECIMAL") => {
                    precision = Some(*p);
                    scale = Some(*s);
                }
                (_, [n]) => max_length = Some(*n),
                _ => {}
            }
            i = close + 1;
        }
    }

    let mut is_array = false;
    loop {
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LBracket) {
            is_array = true;
            if let Some(close) = crate::parser::scan::find_matching_close(tokens, i) {
                i = close + 1;
            } else {
                break;
            }
        } else if tokens.get(i).map(|t| t.is_keyword("ARRAY")).unwrap_or(false) {
            is_array = true;
            i += 1;
            if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LBracket) {
                if let Some(close) = crate::parser::scan::find_matching_close(tokens, i) {
                    i = close + 1;
                }
            }
        } else {
            break;
        }
    }

    let base = if serial.is_some() {
        base_raw
    } else {
        canonical_type_name(&base_raw)
    };

    (
        TypeInfo {
            base,
            max_length,
            precision,
            scale,
            is_array,
            serial,
        },
        i,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(sql: &str) -> TypeInfo {
        let toks = Lexer::tokenize(sql).unwrap();
        parse_type(&toks, 0).0
    }

    #[test]
    fn simple_type() {
        assert_eq!(parse("INT").base, "INTEGER");
    }

    #[test]
    fn numeric_precision_scale() {
        let t = parse("NUMERIC(10,2)");
        assert_eq!(t.precision, Some(10));
        assert_eq!(t.scale, Some(2));
    }

    #[test]
    fn varchar_length() {
        let t = parse("VARCHAR(255)");
        assert_eq!(t.max_length, Some(255));
    }

    #[test]
    fn double_precision() {
        assert_eq!(parse("DOUBLE PRECISION").base, "DOUBLE PRECISION");
    }

    #[test]
    fn timestamptz_alias() {
        assert_eq!(parse("TIMESTAMPTZ").base, "TIMESTAMP WITH TIME ZONE");
        assert_eq!(parse("TIMESTAMP WITH TIME ZONE").base, "TIMESTAMP WITH TIME ZONE");
    }

    #[test]
    fn array_suffix() {
        let t = parse("INT[]");
        assert!(t.is_array);
        assert_eq!(t.base, "INTEGER");
    }

    #[test]
    fn bigserial_detected() {
        let t = parse("BIGSERIAL");
        assert_eq!(t.serial, Some(SerialKind::Big));
    }
}
