//! TimescaleDB management-function call handlers: `create_hypertable`,
//! `add_compression_policy`, `add_retention_policy`,
//! `add_continuous_aggregate_policy`.
//!
//! These are ordinary `SELECT fn(...)` calls, not DDL statements, so they
//! are recognized by statement-kind detection on the called function name
//! (see [`crate::parser::statement::detect_kind`]) rather than by keyword
//! dispatch on the lexed token kinds.

use crate::lexer::{Token, TokenKind};
use crate::model::{CompressionSettings, Hypertable, RefreshPolicy, RetentionPolicy};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{find_matching_close, find_next_lparen, split_by_comma, tokens_to_text};
use std::collections::HashMap;

/// One call argument: either positional (an unnamed expression) or a
/// keyword argument of the form `name => expr` (our lexer tokenizes `=>` as
/// two adjacent operator tokens, `=` then `>`, since it isn't in the
/// multi-character operator set).
enum Arg<'t, 'src> {
    Positional(&'t [Token<'src>]),
    Keyword(String, &'t [Token<'src>]),
}

fn classify_args<'t, 'src>(parts: Vec<&'t [Token<'src>]>) -> Vec<Arg<'t, 'src>> {
    parts
        .into_iter()
        .map(|part| {
            if part.len() >= 3
                && matches!(part[0].kind, TokenKind::Identifier | TokenKind::Keyword)
                && part[1].kind == TokenKind::Operator
                && part[1].text == "="
                && part[2].kind == TokenKind::Operator
                && part[2].text == ">"
            {
                Arg::Keyword(part[0].text.to_lowercase(), &part[3..])
            } else {
                Arg::Positional(part)
            }
        })
        .collect()
}

/// Renders an argument expression to a comparable string, reducing
/// `INTERVAL 'x'` to just `x` and stripping quotes off a bare string
/// literal.
fn render_value(tokens: &[Token]) -> String {
    if tokens.len() == 2 && tokens[0].is_keyword("INTERVAL") && tokens[1].kind == TokenKind::String {
        return unquote(tokens[1].text);
    }
    if tokens.len() == 1 && tokens[0].kind == TokenKind::String {
        return unquote(tokens[0].text);
    }
    tokens_to_text(tokens)
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn call_args<'t, 'src>(tokens: &'t [Token<'src>]) -> Option<Vec<Arg<'t, 'src>>> {
    let open = find_next_lparen(tokens, 0)?;
    let close = find_matching_close(tokens, open)?;
    Some(classify_args(split_by_comma(&tokens[open + 1..close])))
}

pub fn handle_create_hypertable(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let args = call_args(tokens).ok_or_else(|| missing(ctx, "create_hypertable", "argument list"))?;
    let mut positional = Vec::new();
    let mut keyword: HashMap<String, String> = HashMap::new();

    for arg in &args {
        match arg {
            Arg::Positional(toks) => positional.push(*toks),
            Arg::Keyword(name, toks) => {
                keyword.insert(name.clone(), render_value(toks));
            }
        }
    }

    let table_tok = positional
        .first()
        .and_then(|t| t.first())
        .ok_or_else(|| missing(ctx, "create_hypertable", "table argument"))?;
    let table = split_qualified_name(&unquote(table_tok.text), &ctx.default_schema());

    let mut time_column = String::new();
    let mut chunk_time_interval = None;

    if let Some(second) = positional.get(1) {
        if second.len() == 1 && second[0].kind == TokenKind::String {
            // Legacy positional form: second arg is the time column name.
            time_column = unquote(second[0].text);
        } else if second.first().map(|t| t.text.eq_ignore_ascii_case("by_range")).unwrap_or(false) {
            if let Some(inner_args) = call_args(second) {
                let inner = classify_args(
                    inner_args
                        .into_iter()
                        .map(|a| match a {
                            Arg::Positional(t) => t,
                            Arg::Keyword(_, t) => t,
                        })
                        .collect(),
                );
                for (idx, a) in inner.into_iter().enumerate() {
                    match a {
                        Arg::Positional(t) if idx == 0 => time_column = render_value(t),
                        Arg::Positional(t) if idx == 1 => chunk_time_interval = Some(render_value(t)),
                        _ => {}
                    }
                }
            }
        }
    }

    if let Some(v) = keyword.get("chunk_time_interval") {
        chunk_time_interval = Some(v.clone());
    }

    let space_partitions = keyword
        .get("number_partitions")
        .and_then(|v| v.parse().ok())
        .or_else(|| keyword.get("partitioning_column").map(|_| 1));

    let dimensions = 1 + if space_partitions.is_some() { 1 } else { 0 };

    ctx.model.upsert_hypertable(Hypertable {
        table,
        time_column,
        time_column_type: String::new(),
        chunk_time_interval,
        dimensions,
        space_partitions,
        compression: None,
        retention: None,
    });
    Ok(())
}

pub fn handle_add_compression_policy(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let args = call_args(tokens).ok_or_else(|| missing(ctx, "add_compression_policy", "argument list"))?;
    let (table, keyword) = table_and_keywords(&args, ctx)?;

    let Some(ht) = ctx
        .model
        .hypertables
        .iter_mut()
        .find(|h| crate::normalize::qualified_names_eq(&h.table, &table))
    else {
        ctx.warn(format!("add_compression_policy references unknown hypertable {table}"));
        return Ok(());
    };
    let compress_after = keyword.get("compress_after").cloned();
    let settings = ht.compression.get_or_insert(CompressionSettings {
        compress_after: None,
        segment_by: Vec::new(),
        order_by: Vec::new(),
    });
    settings.compress_after = compress_after;
    Ok(())
}

pub fn handle_add_retention_policy(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let args = call_args(tokens).ok_or_else(|| missing(ctx, "add_retention_policy", "argument list"))?;
    let (table, keyword) = table_and_keywords(&args, ctx)?;

    let drop_after = keyword
        .get("drop_after")
        .cloned()
        .ok_or_else(|| missing(ctx, "add_retention_policy", "drop_after"))?;

    let Some(ht) = ctx
        .model
        .hypertables
        .iter_mut()
        .find(|h| crate::normalize::qualified_names_eq(&h.table, &table))
    else {
        ctx.warn(format!("add_retention_policy references unknown hypertable {table}"));
        return Ok(());
    };
    ht.retention = Some(RetentionPolicy { drop_after });
    Ok(())
}

pub fn handle_add_continuous_aggregate_policy(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let args = call_args(tokens).ok_or_else(|| missing(ctx, "add_continuous_aggregate_policy", "argument list"))?;
    let (view, keyword) = table_and_keywords(&args, ctx)?;

    let policy = RefreshPolicy {
        start_offset: keyword.get("start_offset").cloned().unwrap_or_default(),
        end_offset: keyword.get("end_offset").cloned().unwrap_or_default(),
        schedule_interval: keyword.get("schedule_interval").cloned().unwrap_or_default(),
    };

    if let Some(cagg) = ctx
        .model
        .continuous_aggregates
        .iter_mut()
        .find(|c| crate::normalize::qualified_names_eq(&c.name, &view))
    {
        cagg.refresh_policy = Some(policy);
    } else {
        ctx.warn(format!("add_continuous_aggregate_policy references unknown view {view}"));
    }
    Ok(())
}

fn table_and_keywords(
    args: &[Arg],
    ctx: &mut HandlerCtx,
) -> Result<(crate::model::QualifiedName, HashMap<String, String>), ParseError> {
    let mut positional_first = None;
    let mut keyword = HashMap::new();
    for arg in args {
        match arg {
            Arg::Positional(toks) if positional_first.is_none() => positional_first = Some(*toks),
            Arg::Keyword(name, toks) => {
                keyword.insert(name.clone(), render_value(toks));
            }
            _ => {}
        }
    }
    let tok = positional_first
        .and_then(|t| t.first())
        .ok_or_else(|| missing(ctx, "policy call", "target argument"))?;
    Ok((split_qualified_name(&unquote(tok.text), &ctx.default_schema()), keyword))
}

fn missing(ctx: &HandlerCtx, fn_name: &str, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: format!("SELECT {fn_name}(...)"),
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
    fn legacy_positional_create_hypertable() {
        let model = run(
            "SELECT create_hypertable('metrics', 'ts', chunk_time_interval => INTERVAL '1 day')",
            handle_create_hypertable,
        );
        let ht = &model.hypertables[0];
        assert_eq!(ht.time_column, "ts");
        assert_eq!(ht.chunk_time_interval.as_deref(), Some("1 day"));
    }

    #[test]
    fn by_range_create_hypertable() {
        let model = run(
            "SELECT create_hypertable('metrics', by_range('ts', INTERVAL '1 day'))",
            handle_create_hypertable,
        );
        let ht = &model.hypertables[0];
        assert_eq!(ht.time_column, "ts");
        assert_eq!(ht.chunk_time_interval.as_deref(), Some("1 day"));
    }

    #[test]
    fn retention_policy_attaches_to_existing_hypertable() {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        model.upsert_hypertable(Hypertable {
            table: crate::model::QualifiedName::new("public", "metrics"),
            time_column: "ts".to_string(),
            time_column_type: "TIMESTAMP".to_string(),
            chunk_time_interval: None,
            dimensions: 1,
            space_partitions: None,
            compression: None,
            retention: None,
        });
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        let tokens = Lexer::tokenize("SELECT add_retention_policy('metrics', drop_after => INTERVAL '90 days')").unwrap();
        let mut ctx = HandlerCtx {
            config: &cfg,
            model: &mut model,
            pending: &mut pending,
            warnings: &mut warnings,
            line: 1,
        };
        handle_add_retention_policy(&tokens, &mut ctx).unwrap();
        assert_eq!(
            model.hypertables[0].retention.as_ref().unwrap().drop_after,
            "90 days"
        );
    }
}
