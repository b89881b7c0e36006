//! `CREATE [UNIQUE] INDEX` handler.

use crate::lexer::{Token, TokenKind};
use crate::model::{Index, QualifiedName};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{
    find_matching_close, find_next_lparen, is_kw, match_keywords, skip_comments, split_by_comma,
    tokens_to_text,
};

/// `CREATE [UNIQUE] INDEX [CONCURRENTLY] [IF NOT EXISTS] name ON [ONLY]
/// target [USING method] (cols) [INCLUDE (cols)] [WHERE predicate]`
pub fn handle_create_index(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let full_definition = tokens_to_text(&tokens[..tokens.len().saturating_sub(1)]);

    let mut i = skip_comments(tokens, 0);
    i += 1; // CREATE
    i = skip_comments(tokens, i);
    let is_unique = is_kw(tokens, i, "UNIQUE");
    if is_unique {
        i += 1;
    }
    i = match_keywords(tokens, i, &["INDEX"]).ok_or_else(|| missing(ctx, "INDEX"))?;
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "CONCURRENTLY") {
        i += 1;
        i = skip_comments(tokens, i);
    }
    if let Some(idx) = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]) {
        i = idx;
    }
    i = skip_comments(tokens, i);

    // An anonymous index (`CREATE INDEX ON t (...)`, postgres allows omitting
    // the name) is detected by the next keyword being `ON`.
    let mut name = None;
    if !is_kw(tokens, i, "ON") {
        let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "index name"))?;
        name = Some(crate::normalize::normalize_identifier(name_tok.text));
        i += 1;
        i = skip_comments(tokens, i);
    }

    i = match_keywords(tokens, i, &["ON"]).ok_or_else(|| missing(ctx, "ON target"))?;
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "ONLY") {
        i += 1;
        i = skip_comments(tokens, i);
    }
    let target_tok = tokens.get(i).ok_or_else(|| missing(ctx, "target table"))?;
    let target = split_qualified_name(target_tok.text, &ctx.default_schema());
    i += 1;
    i = skip_comments(tokens, i);

    let mut index_type = "btree".to_string();
    if let Some(idx) = match_keywords(tokens, i, &["USING"]) {
        i = skip_comments(tokens, idx);
        if let Some(method_tok) = tokens.get(i) {
            index_type = method_tok.text.to_lowercase();
            i += 1;
            i = skip_comments(tokens, i);
        }
    }

    let open = find_next_lparen(tokens, i).ok_or_else(|| missing(ctx, "column list"))?;
    let close = find_matching_close(tokens, open).ok_or_else(|| missing(ctx, "column list"))?;
    let columns = split_by_comma(&tokens[open + 1..close])
        .into_iter()
        .map(column_expr_text)
        .collect::<Vec<_>>();
    let mut rest = skip_comments(tokens, close + 1);

    let mut include_columns = Vec::new();
    if is_kw(tokens, rest, "INCLUDE") {
        rest += 1;
        rest = skip_comments(tokens, rest);
        if let Some(inc_open) = find_next_lparen(tokens, rest) {
            if let Some(inc_close) = find_matching_close(tokens, inc_open) {
                include_columns = split_by_comma(&tokens[inc_open + 1..inc_close])
                    .into_iter()
                    .map(tokens_to_text)
                    .collect();
                rest = skip_comments(tokens, inc_close + 1);
            }
        }
    }

    let mut storage_params = None;
    if tokens.get(rest).map(|t| t.kind) == Some(TokenKind::LParen) {
        if let Some(p_close) = find_matching_close(tokens, rest) {
            storage_params = Some(tokens_to_text(&tokens[rest..=p_close]));
            rest = skip_comments(tokens, p_close + 1);
        }
    }

    let mut tablespace = None;
    if let Some(idx) = match_keywords(tokens, rest, &["TABLESPACE"]) {
        rest = skip_comments(tokens, idx);
        if let Some(tok) = tokens.get(rest) {
            tablespace = Some(tok.text.to_string());
            rest += 1;
            rest = skip_comments(tokens, rest);
        }
    }

    let mut predicate = None;
    if is_kw(tokens, rest, "WHERE") {
        let predicate_tokens = &tokens[rest + 1..tokens.len().saturating_sub(1)];
        predicate = Some(tokens_to_text(predicate_tokens));
    }

    let name = name.unwrap_or_else(|| generate_index_name(&target.name, &columns));

    let index = Index {
        name: QualifiedName::new(target.schema.clone(), name),
        table: target.clone(),
        index_type,
        is_unique,
        is_primary: false,
        columns,
        include_columns,
        predicate,
        storage_params,
        tablespace,
        definition: full_definition,
    };

    if !ctx.model.attach_index(&target, index) {
        ctx.warn(format!("index references unknown target {target}"));
    }
    Ok(())
}

/// Anonymous-index naming: `{table}_{col1}_{col2}..._idx`, the convention
/// Postgres itself uses for an unnamed `CREATE INDEX`.
fn generate_index_name(table: &str, columns: &[String]) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| c.chars().filter(|ch| ch.is_alphanumeric() || *ch == '_').collect())
        .collect();
    if cols.is_empty() {
        format!("{table}_idx")
    } else {
        format!("{table}_{}_idx", cols.join("_"))
    }
}

/// A column expression is preserved verbatim if it contains parentheses
/// (an expression index); otherwise only the leading identifier is kept,
/// normalized.
fn column_expr_text(tokens: &[Token]) -> String {
    if tokens.iter().any(|t| t.kind == TokenKind::LParen) {
        tokens_to_text(tokens)
    } else if let Some(first) = tokens.first() {
        crate::normalize::normalize_identifier(first.text)
    } else {
        String::new()
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE INDEX".to_string(),
        clause: clause.to_string(),
        snippet: String::new(),
    }
}
