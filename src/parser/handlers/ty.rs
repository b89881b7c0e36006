//! `CREATE TYPE` handler — enum, composite, and domain forms.
//!
//! - `CREATE TYPE name AS ENUM ('a', 'b', ...)`
//! - `CREATE TYPE name AS (field1 type1, field2 type2, ...)` (composite)
//! - `CREATE TYPE name AS RANGE (...)` (range; modeled as composite with the
//!   verbatim subtype clause kept in `definition`, since no dedicated range
//!   shape is modeled)
//! - `CREATE DOMAIN name AS base_type [CHECK (expr)] [DEFAULT expr] [NOT NULL]`

use crate::lexer::{Token, TokenKind};
use crate::model::{CustomType, CustomTypeKind};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{find_matching_close, find_next_lparen, is_kw, match_keywords, skip_comments, split_by_comma, tokens_to_text};

pub fn handle_create_type(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let full_definition = tokens_to_text(&tokens[..tokens.len().saturating_sub(1)]);

    let mut i = match_keywords(tokens, 0, &["CREATE", "TYPE"]).ok_or_else(|| missing(ctx, "TYPE", "name"))?;
    i = skip_comments(tokens, i);
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "TYPE", "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;

    i = match_keywords(tokens, i, &["AS"]).ok_or_else(|| missing(ctx, "TYPE", "AS"))?;
    i = skip_comments(tokens, i);

    let (kind, values) = if is_kw(tokens, i, "ENUM") {
        i += 1;
        let open = find_next_lparen(tokens, i).ok_or_else(|| missing(ctx, "TYPE AS ENUM", "value list"))?;
        let close = find_matching_close(tokens, open).ok_or_else(|| missing(ctx, "TYPE AS ENUM", "value list"))?;
        let labels = split_by_comma(&tokens[open + 1..close])
            .into_iter()
            .map(|part| unquote(tokens_to_text(part).trim()))
            .collect();
        (CustomTypeKind::Enum, Some(labels))
    } else if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LParen) {
        find_matching_close(tokens, i).ok_or_else(|| missing(ctx, "TYPE AS (...)", "field list"))?;
        (CustomTypeKind::Composite, None)
    } else {
        (CustomTypeKind::Composite, None)
    };

    ctx.model.upsert_custom_type(CustomType {
        name,
        kind,
        definition: full_definition,
        values,
        comment: None,
    });
    Ok(())
}

/// `CREATE DOMAIN name AS base_type ...` — stored as a `CustomType` with
/// `kind: Domain`, its definition kept verbatim (the constraint/default text
/// is not modeled further, matching the minimal domain support called for).
pub fn handle_create_domain(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let full_definition = tokens_to_text(&tokens[..tokens.len().saturating_sub(1)]);

    let mut i =
        match_keywords(tokens, 0, &["CREATE", "DOMAIN"]).ok_or_else(|| missing(ctx, "DOMAIN", "name"))?;
    i = skip_comments(tokens, i);
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "DOMAIN", "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());

    ctx.model.upsert_custom_type(CustomType {
        name,
        kind: CustomTypeKind::Domain,
        definition: full_definition,
        values: None,
        comment: None,
    });
    Ok(())
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn missing(ctx: &HandlerCtx, stmt: &str, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: stmt.to_string(),
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

    fn run(sql: &str, handler: fn(&[Token], &mut HandlerCtx) -> Result<(), ParseError>) -> SchemaModel {
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
        handler(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn enum_type_labels() {
        let model = run(
            "CREATE TYPE public.mood AS ENUM ('sad', 'ok', 'happy')",
            handle_create_type,
        );
        let ty = &model.custom_types[0];
        assert_eq!(ty.kind, CustomTypeKind::Enum);
        assert_eq!(ty.values.as_ref().unwrap(), &vec!["sad", "ok", "happy"]);
    }

    #[test]
    fn composite_type() {
        let model = run(
            "CREATE TYPE public.point AS (x DOUBLE PRECISION, y DOUBLE PRECISION)",
            handle_create_type,
        );
        assert_eq!(model.custom_types[0].kind, CustomTypeKind::Composite);
        assert!(model.custom_types[0].values.is_none());
    }

    #[test]
    fn domain_type() {
        let model = run(
            "CREATE DOMAIN public.positive_int AS INTEGER CHECK (VALUE > 0)",
            handle_create_domain,
        );
        assert_eq!(model.custom_types[0].kind, CustomTypeKind::Domain);
        assert!(model.custom_types[0].definition.contains("VALUE"));
    }
}
