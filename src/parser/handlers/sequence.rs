//! `CREATE SEQUENCE` handler.
//!
//! `CREATE [TEMPORARY] SEQUENCE [IF NOT EXISTS] name
//!   [AS data_type]
//!   [INCREMENT [BY] n]
//!   [MINVALUE n | NO MINVALUE]
//!   [MAXVALUE n | NO MAXVALUE]
//!   [START [WITH] n]
//!   [CACHE n]
//!   [[NO] CYCLE]
//!   [OWNED BY table.column | OWNED BY NONE]`
//!
//! Options may appear in any order, matching Postgres's actual grammar.

use crate::lexer::{Token, TokenKind};
use crate::model::Sequence;
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{is_kw, match_keywords, skip_comments};

pub fn handle_create_sequence(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = skip_comments(tokens, 0);
    i += 1; // CREATE
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "TEMPORARY") || is_kw(tokens, i, "TEMP") || is_kw(tokens, i, "UNLOGGED") {
        i += 1;
        i = skip_comments(tokens, i);
    }
    i = match_keywords(tokens, i, &["SEQUENCE"]).ok_or_else(|| missing(ctx, "name"))?;
    i = skip_comments(tokens, i);
    if let Some(idx) = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]) {
        i = idx;
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;

    let mut data_type = "BIGINT".to_string();
    let mut increment: i64 = 1;
    let mut start_value: Option<i64> = None;
    let mut min_value: Option<i64> = None;
    let mut max_value: Option<i64> = None;
    let mut cache_size: i64 = 1;
    let mut is_cyclic = false;
    let mut owned_by_table = None;
    let mut owned_by_column = None;

    loop {
        i = skip_comments(tokens, i);
        if is_kw(tokens, i, "AS") {
            i += 1;
            i = skip_comments(tokens, i);
            let (info, next) = crate::parser::types::parse_type(tokens, i);
            data_type = info.base;
            i = next;
        } else if is_kw(tokens, i, "INCREMENT") {
            i += 1;
            i = skip_comments(tokens, i);
            if is_kw(tokens, i, "BY") {
                i += 1;
            }
            let (n, next) = read_signed_int(tokens, i);
            if let Some(n) = n {
                increment = n;
            }
            i = next;
        } else if is_kw(tokens, i, "START") {
            i += 1;
            i = skip_comments(tokens, i);
            if is_kw(tokens, i, "WITH") {
                i += 1;
            }
            let (n, next) = read_signed_int(tokens, i);
            start_value = n;
            i = next;
        } else if is_kw(tokens, i, "MINVALUE") {
            i += 1;
            let (n, next) = read_signed_int(tokens, i);
            min_value = n;
            i = next;
        } else if is_kw(tokens, i, "MAXVALUE") {
            i += 1;
            let (n, next) = read_signed_int(tokens, i);
            max_value = n;
            i = next;
        } else if is_kw(tokens, i, "NO") {
            let save = i;
            i += 1;
            i = skip_comments(tokens, i);
            if is_kw(tokens, i, "MINVALUE") {
                i += 1;
                min_value = None;
            } else if is_kw(tokens, i, "MAXVALUE") {
                i += 1;
                max_value = None;
            } else if is_kw(tokens, i, "CYCLE") {
                i += 1;
                is_cyclic = false;
            } else {
                i = save;
                break;
            }
        } else if is_kw(tokens, i, "CACHE") {
            i += 1;
            let (n, next) = read_signed_int(tokens, i);
            if let Some(n) = n {
                cache_size = n;
            }
            i = next;
        } else if is_kw(tokens, i, "CYCLE") {
            i += 1;
            is_cyclic = true;
        } else if is_kw(tokens, i, "OWNED") {
            i += 1;
            i = skip_comments(tokens, i);
            if is_kw(tokens, i, "BY") {
                i += 1;
            }
            i = skip_comments(tokens, i);
            if is_kw(tokens, i, "NONE") {
                i += 1;
            } else if let Some(tok) = tokens.get(i) {
                let full = tok.text;
                if let Some((table, column)) = full.rsplit_once('.') {
                    owned_by_table = Some(table.to_string());
                    owned_by_column = Some(crate::normalize::normalize_identifier(column));
                }
                i += 1;
            }
        } else {
            break;
        }
    }

    let min_default = 1i64;
    let max_default = default_max_for_type(&data_type);

    ctx.model.upsert_sequence(Sequence {
        name,
        data_type,
        start_value: start_value.unwrap_or(min_value.unwrap_or(min_default)),
        min_value: min_value.unwrap_or(min_default),
        max_value: max_value.unwrap_or(max_default),
        increment,
        cache_size,
        is_cyclic,
        owned_by_table,
        owned_by_column,
        implicit: false,
    });
    Ok(())
}

fn default_max_for_type(data_type: &str) -> i64 {
    match data_type {
        "SMALLINT" => 32767,
        "INTEGER" => 2147483647,
        _ => i64::MAX,
    }
}

/// Reads an optional `-? number` literal, returning `None` if the next token
/// isn't one (leaving `i` untouched in that case).
fn read_signed_int(tokens: &[Token], from: usize) -> (Option<i64>, usize) {
    let mut i = skip_comments(tokens, from);
    let mut negative = false;
    if tokens.get(i).map(|t| t.kind == TokenKind::Operator && t.text == "-").unwrap_or(false) {
        negative = true;
        i += 1;
        i = skip_comments(tokens, i);
    }
    match tokens.get(i) {
        Some(t) if t.kind == TokenKind::Number => {
            let value: i64 = t.text.parse().unwrap_or(0);
            (Some(if negative { -value } else { value }), i + 1)
        }
        _ => (None, from),
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE SEQUENCE".to_string(),
        clause: clause.to_string(),
        snippet: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::Lexer;
    use crate::model::SchemaModel;
    use crate::parser::pending::PendingAttachments;

    fn run(sql: &str) -> SchemaModel {
        let tokens = Lexer::tokenize(sql).unwrap();
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        let mut ctx = HandlerCtx {
            config: &cfg,
            model: &mut model,
            pending: &mut pending,
            warnings: &mut warnings,
            line: 1,
        };
        handle_create_sequence(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn bare_sequence_uses_defaults() {
        let model = run("CREATE SEQUENCE public.orders_id_seq");
        let seq = &model.sequences[0];
        assert_eq!(seq.increment, 1);
        assert_eq!(seq.min_value, 1);
        assert_eq!(seq.max_value, i64::MAX);
        assert!(!seq.is_cyclic);
        assert!(!seq.implicit);
    }

    #[test]
    fn options_in_nonstandard_order() {
        let model = run(
            "CREATE SEQUENCE s AS INTEGER CYCLE CACHE 5 START WITH 10 INCREMENT BY 2 MAXVALUE 100",
        );
        let seq = &model.sequences[0];
        assert_eq!(seq.data_type, "INTEGER");
        assert!(seq.is_cyclic);
        assert_eq!(seq.cache_size, 5);
        assert_eq!(seq.start_value, 10);
        assert_eq!(seq.increment, 2);
        assert_eq!(seq.max_value, 100);
    }

    #[test]
    fn owned_by_column() {
        let model = run("CREATE SEQUENCE s OWNED BY orders.id");
        let seq = &model.sequences[0];
        assert_eq!(seq.owned_by_table.as_deref(), Some("orders"));
        assert_eq!(seq.owned_by_column.as_deref(), Some("id"));
    }
}
