//! `CREATE EXTENSION [IF NOT EXISTS] name [WITH] [SCHEMA schema] [VERSION version]` handler.

use crate::lexer::Token;
use crate::model::Extension;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{is_kw, match_keywords, skip_comments};

pub fn handle_create_extension(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["CREATE", "EXTENSION"]).ok_or_else(|| missing(ctx, "name"))?;
    i = skip_comments(tokens, i);
    if let Some(idx) = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]) {
        i = idx;
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "name"))?;
    let name = crate::normalize::normalize_identifier(name_tok.text);
    i += 1;

    let mut schema = ctx.default_schema();
    let mut version = None;

    loop {
        i = skip_comments(tokens, i);
        if is_kw(tokens, i, "WITH") {
            i += 1;
        } else if is_kw(tokens, i, "SCHEMA") {
            i += 1;
            i = skip_comments(tokens, i);
            if let Some(tok) = tokens.get(i) {
                schema = crate::normalize::normalize_identifier(tok.text);
                i += 1;
            }
        } else if is_kw(tokens, i, "VERSION") {
            i += 1;
            i = skip_comments(tokens, i);
            if let Some(tok) = tokens.get(i) {
                version = Some(strip_quotes(tok.text));
                i += 1;
            }
        } else {
            break;
        }
    }

    ctx.model.ensure_namespace(&schema);
    ctx.model.upsert_extension(Extension {
        name,
        schema,
        version,
        comment: None,
    });
    Ok(())
}

fn strip_quotes(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE EXTENSION".to_string(),
        clause: clause.to_string(),
        snippet: String::new(),
    }
}
