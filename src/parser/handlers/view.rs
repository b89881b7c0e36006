//! `CREATE [OR REPLACE] VIEW` and `CREATE MATERIALIZED VIEW` handlers.
//!
//! A materialized view carrying a `WITH (timescaledb.continuous)` clause is
//! a TimescaleDB continuous aggregate and is stored separately — it never
//! appears in `SchemaModel.materialized_views`.

use crate::lexer::{Token, TokenKind};
use crate::model::{ContinuousAggregate, MaterializedView, View};
use crate::normalize::{split_qualified_name, strip_line_comments};
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{find_matching_close, is_kw, match_keywords, skip_comments, tokens_to_text};

pub fn handle_create_view(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = skip_comments(tokens, 0);
    i += 1; // CREATE
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "OR") {
        i = match_keywords(tokens, i, &["OR", "REPLACE"]).unwrap_or(i);
    }
    i = match_keywords(tokens, i, &["VIEW"]).ok_or_else(|| missing(ctx, "VIEW", "name"))?;
    i = skip_comments(tokens, i);
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "VIEW", "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;

    let as_idx = match_keywords(tokens, i, &["AS"]).ok_or_else(|| missing(ctx, "VIEW", "AS"))?;
    let body_tokens = &tokens[as_idx..tokens.len().saturating_sub(1)];
    let definition = clean_body(body_tokens);

    ctx.model.upsert_view(View {
        name,
        definition,
        comment: None,
    });
    Ok(())
}

pub fn handle_create_materialized_view(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["CREATE", "MATERIALIZED", "VIEW"])
        .ok_or_else(|| missing(ctx, "MATERIALIZED VIEW", "name"))?;
    i = skip_comments(tokens, i);
    if let Some(idx) = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]) {
        i = idx;
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "MATERIALIZED VIEW", "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;
    i = skip_comments(tokens, i);

    let mut continuous = false;
    if is_kw(tokens, i, "WITH") {
        let open = i + 1;
        if tokens.get(open).map(|t| t.kind) == Some(TokenKind::LParen) {
            if let Some(close) = find_matching_close(tokens, open) {
                let options = tokens_to_text(&tokens[open..=close]);
                if options.to_ascii_lowercase().contains("timescaledb.continuous") {
                    continuous = true;
                }
                i = skip_comments(tokens, close + 1);
            }
        }
    }

    let as_idx = match_keywords(tokens, i, &["AS"])
        .ok_or_else(|| missing(ctx, "MATERIALIZED VIEW", "AS"))?;

    // `WITH [NO] DATA` trails the SELECT body; strip it from the verbatim
    // definition and record the flag.
    let tail = &tokens[as_idx..tokens.len().saturating_sub(1)];
    let (body_tokens, with_data) = split_with_data_tail(tail);
    let definition = clean_body(body_tokens);

    if continuous {
        let hypertable = extract_first_from(body_tokens, &ctx.default_schema())
            .unwrap_or_else(|| name.clone());
        ctx.model.upsert_continuous_aggregate(ContinuousAggregate {
            name,
            hypertable,
            definition,
            materialized: true,
            finalized: true,
            with_data,
            indexes: Vec::new(),
            refresh_policy: None,
            comment: None,
        });
    } else {
        ctx.model.upsert_materialized_view(MaterializedView {
            name,
            definition,
            comment: None,
            with_data,
            indexes: Vec::new(),
            tablespace: None,
        });
    }
    Ok(())
}

/// Strips a trailing `WITH [NO] DATA` clause, returning the remaining body
/// tokens and whether data is populated (defaults to `true`, matching
/// Postgres's default when the clause is omitted).
fn split_with_data_tail<'t, 'src>(tokens: &'t [Token<'src>]) -> (&'t [Token<'src>], bool) {
    if tokens.len() >= 2 {
        let last = &tokens[tokens.len() - 1];
        let second_last = &tokens[tokens.len() - 2];
        if last.is_keyword("DATA") {
            if second_last.is_keyword("WITH") {
                return (&tokens[..tokens.len() - 2], true);
            }
            if second_last.is_keyword("NO") && tokens.len() >= 3 && tokens[tokens.len() - 3].is_keyword("WITH") {
                return (&tokens[..tokens.len() - 3], false);
            }
        }
    }
    (tokens, true)
}

/// Finds the first `FROM <target>` in a SELECT body and splits it into a
/// qualified name — used to resolve a continuous aggregate's underlying
/// hypertable when not explicitly stated elsewhere.
fn extract_first_from(tokens: &[Token], default_schema: &str) -> Option<crate::model::QualifiedName> {
    for (i, tok) in tokens.iter().enumerate() {
        if tok.is_keyword("FROM") {
            let target = tokens.get(i + 1)?;
            return Some(split_qualified_name(target.text, default_schema));
        }
    }
    None
}

/// Renders the SELECT body verbatim, with inline `--` comments stripped
/// (but not block comments, which remain as part of the original source
/// slice since they are rare in view bodies and the spec only calls out
/// `--` stripping here).
fn clean_body(tokens: &[Token]) -> String {
    let raw = tokens_to_text(tokens);
    strip_line_comments(&raw).trim().to_string()
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
        let kind = crate::parser::statement::detect_kind(&tokens);
        match kind {
            crate::parser::statement::StatementKind::CreateView => {
                handle_create_view(&tokens, &mut ctx).unwrap()
            }
            crate::parser::statement::StatementKind::CreateMaterializedView => {
                handle_create_materialized_view(&tokens, &mut ctx).unwrap()
            }
            _ => panic!("unexpected kind"),
        }
        model
    }

    #[test]
    fn simple_view() {
        let model = run("CREATE VIEW public.active_users AS SELECT * FROM users WHERE active = true");
        assert_eq!(model.views.len(), 1);
        assert!(model.views[0].definition.contains("SELECT"));
    }

    #[test]
    fn materialized_view_with_no_data() {
        let model = run("CREATE MATERIALIZED VIEW public.hourly AS SELECT 1 WITH NO DATA");
        assert_eq!(model.materialized_views.len(), 1);
        assert!(!model.materialized_views[0].with_data);
    }

    #[test]
    fn continuous_aggregate_detected_and_excluded_from_materialized_views() {
        let model = run(
            "CREATE MATERIALIZED VIEW public.hourly WITH (timescaledb.continuous) AS \
             SELECT time_bucket('1 hour', ts), avg(val) FROM metrics GROUP BY 1 WITH NO DATA",
        );
        assert!(model.materialized_views.is_empty());
        assert_eq!(model.continuous_aggregates.len(), 1);
        let cagg = &model.continuous_aggregates[0];
        assert_eq!(cagg.name.name, "hourly");
        assert_eq!(cagg.hypertable.name, "metrics");
        assert!(!cagg.with_data);
    }
}
