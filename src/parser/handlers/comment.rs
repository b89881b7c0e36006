//! `COMMENT ON <target> IS <text|NULL>` handler.

use crate::lexer::{Token, TokenKind};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{is_kw, match_keywords, skip_comments};

enum Target {
    Table(crate::model::QualifiedName),
    Column(crate::model::QualifiedName, String),
    View(crate::model::QualifiedName),
    MaterializedView(crate::model::QualifiedName),
    Function(crate::model::QualifiedName),
    Extension(String),
    Type(crate::model::QualifiedName),
}

pub fn handle_comment_on(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["COMMENT", "ON"]).ok_or_else(|| missing(ctx, "target"))?;
    i = skip_comments(tokens, i);

    let (target, next) = parse_target(tokens, i, ctx)?;
    i = skip_comments(tokens, next);

    i = match_keywords(tokens, i, &["IS"]).ok_or_else(|| missing(ctx, "IS"))?;
    i = skip_comments(tokens, i);

    let text = parse_comment_text(tokens, i);

    apply_comment(ctx, target, text);
    Ok(())
}

fn parse_target(tokens: &[Token], mut i: usize, ctx: &mut HandlerCtx) -> Result<(Target, usize), ParseError> {
    let default_schema = ctx.default_schema();

    if is_kw(tokens, i, "COLUMN") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "column reference"))?;
        // `table.column` — split on the last dot.
        let full = tok.text;
        let (table_part, col_part) = full.rsplit_once('.').unwrap_or(("", full));
        let column = crate::normalize::normalize_identifier(col_part);
        let table = if table_part.is_empty() {
            ctx.warn("COMMENT ON COLUMN missing table qualifier");
            crate::model::QualifiedName::new(default_schema, "")
        } else {
            split_qualified_name(table_part, &default_schema)
        };
        return Ok((Target::Column(table, column), i + 1));
    }
    if is_kw(tokens, i, "TABLE") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "table name"))?;
        return Ok((Target::Table(split_qualified_name(tok.text, &default_schema)), i + 1));
    }
    if is_kw(tokens, i, "MATERIALIZED") {
        i = skip_comments(tokens, i + 1);
        i = skip_comments(tokens, match_keywords(tokens, i, &["VIEW"]).unwrap_or(i));
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "materialized view name"))?;
        return Ok((
            Target::MaterializedView(split_qualified_name(tok.text, &default_schema)),
            i + 1,
        ));
    }
    if is_kw(tokens, i, "VIEW") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "view name"))?;
        return Ok((Target::View(split_qualified_name(tok.text, &default_schema)), i + 1));
    }
    if is_kw(tokens, i, "FUNCTION") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "function name"))?;
        let name = split_qualified_name(tok.text, &default_schema);
        i += 1;
        // Skip an optional argument-type list; not needed to locate by name
        // alone since COMMENT ON FUNCTION targets are rare overloads here.
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LParen) {
            if let Some(close) = crate::parser::scan::find_matching_close(tokens, i) {
                i = close + 1;
            }
        }
        return Ok((Target::Function(name), i));
    }
    if is_kw(tokens, i, "EXTENSION") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "extension name"))?;
        return Ok((Target::Extension(crate::normalize::normalize_identifier(tok.text)), i + 1));
    }
    if is_kw(tokens, i, "TYPE") {
        i = skip_comments(tokens, i + 1);
        let tok = tokens.get(i).ok_or_else(|| missing(ctx, "type name"))?;
        return Ok((Target::Type(split_qualified_name(tok.text, &default_schema)), i + 1));
    }

    Err(missing(ctx, "recognized target kind"))
}

/// `'a' 'b' 'c'` (adjacent string literals) concatenate verbatim; a
/// dollar-quoted literal or `NULL` are also accepted.
fn parse_comment_text(tokens: &[Token], from: usize) -> Option<String> {
    let mut i = skip_comments(tokens, from);
    if is_kw(tokens, i, "NULL") {
        return None;
    }
    let mut parts = Vec::new();
    loop {
        match tokens.get(i) {
            Some(t) if t.kind == TokenKind::String => {
                parts.push(unquote_string(t.text));
                i = skip_comments(tokens, i + 1);
            }
            _ => break,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(""))
    }
}

fn unquote_string(raw: &str) -> String {
    if raw.starts_with('$') {
        if let Some(rest) = raw.strip_prefix('$') {
            if let Some(tag_end) = rest.find('$') {
                let tag_len = tag_end + 2;
                if raw.len() >= tag_len * 2 {
                    return raw[tag_len..raw.len() - tag_len].to_string();
                }
            }
        }
        raw.to_string()
    } else if raw.len() >= 2 {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn apply_comment(ctx: &mut HandlerCtx, target: Target, text: Option<String>) {
    match target {
        Target::Table(name) => {
            if let Some(t) = ctx.model.find_table_mut(&name) {
                t.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON TABLE references unknown table {name}"));
            }
        }
        Target::Column(table, column) => {
            if let Some(t) = ctx.model.find_table_mut(&table) {
                if let Some(col) = t.columns.iter_mut().find(|c| crate::normalize::identifiers_eq(&c.name, &column)) {
                    col.comment = text;
                } else {
                    ctx.warn(format!("COMMENT ON COLUMN references unknown column {table}.{column}"));
                }
            } else {
                ctx.warn(format!("COMMENT ON COLUMN references unknown table {table}"));
            }
        }
        Target::View(name) => {
            if let Some(v) = ctx
                .model
                .views
                .iter_mut()
                .find(|v| crate::normalize::qualified_names_eq(&v.name, &name))
            {
                v.comment = text;
            } else if let Some(cagg) = ctx
                .model
                .continuous_aggregates
                .iter_mut()
                .find(|c| crate::normalize::qualified_names_eq(&c.name, &name))
            {
                cagg.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON VIEW references unknown view {name}"));
            }
        }
        Target::MaterializedView(name) => {
            if let Some(v) = ctx
                .model
                .materialized_views
                .iter_mut()
                .find(|v| crate::normalize::qualified_names_eq(&v.name, &name))
            {
                v.comment = text;
            } else if let Some(cagg) = ctx
                .model
                .continuous_aggregates
                .iter_mut()
                .find(|c| crate::normalize::qualified_names_eq(&c.name, &name))
            {
                cagg.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON MATERIALIZED VIEW references unknown view {name}"));
            }
        }
        Target::Function(name) => {
            if let Some(f) = ctx
                .model
                .functions
                .iter_mut()
                .find(|f| crate::normalize::qualified_names_eq(&f.name, &name))
            {
                f.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON FUNCTION references unknown function {name}"));
            }
        }
        Target::Extension(name) => {
            if let Some(e) = ctx
                .model
                .extensions
                .iter_mut()
                .find(|e| crate::normalize::identifiers_eq(&e.name, &name))
            {
                e.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON EXTENSION references unknown extension {name}"));
            }
        }
        Target::Type(name) => {
            if let Some(t) = ctx
                .model
                .custom_types
                .iter_mut()
                .find(|t| crate::normalize::qualified_names_eq(&t.name, &name))
            {
                t.comment = text;
            } else {
                ctx.warn(format!("COMMENT ON TYPE references unknown type {name}"));
            }
        }
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "COMMENT ON".to_string(),
        clause: clause.to_string(),
        snippet: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::Lexer;
    use crate::model::{SchemaModel, Table};
    use crate::parser::pending::PendingAttachments;

    fn run_with_table(table: Table, comment_sql: &str) -> SchemaModel {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        model.upsert_table(table);
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        let tokens = Lexer::tokenize(comment_sql).unwrap();
        let mut ctx = HandlerCtx {
            config: &cfg,
            model: &mut model,
            pending: &mut pending,
            warnings: &mut warnings,
            line: 1,
        };
        handle_comment_on(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn comment_on_table() {
        let table = Table::new(crate::model::QualifiedName::new("public", "users"));
        let model = run_with_table(table, "COMMENT ON TABLE public.users IS 'holds accounts'");
        assert_eq!(model.tables[0].comment.as_deref(), Some("holds accounts"));
    }

    #[test]
    fn comment_on_column() {
        let mut table = Table::new(crate::model::QualifiedName::new("public", "users"));
        table.columns.push(crate::model::Column::new("email", "TEXT", 1));
        let model = run_with_table(table, "COMMENT ON COLUMN public.users.email IS 'login identifier'");
        assert_eq!(model.tables[0].columns[0].comment.as_deref(), Some("login identifier"));
    }

    #[test]
    fn adjacent_string_literals_concatenate() {
        let table = Table::new(crate::model::QualifiedName::new("public", "users"));
        let model = run_with_table(table, "COMMENT ON TABLE public.users IS 'a' 'b'");
        assert_eq!(model.tables[0].comment.as_deref(), Some("ab"));
    }

    #[test]
    fn missing_target_is_warning_not_error() {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        let tokens = Lexer::tokenize("COMMENT ON TABLE public.ghost IS 'x'").unwrap();
        let mut ctx = HandlerCtx {
            config: &cfg,
            model: &mut model,
            pending: &mut pending,
            warnings: &mut warnings,
            line: 1,
        };
        handle_comment_on(&tokens, &mut ctx).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn comment_is_null_clears() {
        let table = Table::new(crate::model::QualifiedName::new("public", "users"));
        let model = run_with_table(table, "COMMENT ON TABLE public.users IS NULL");
        assert!(model.tables[0].comment.is_none());
    }
}
