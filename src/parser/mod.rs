//! Top-level parse session: tokenize, split into statements, dispatch each
//! to its handler, then resolve deferred forward references.
//!
//! A lexer failure is fatal for the *whole* source (the lexer has no way to
//! resume mid-file), so it surfaces as a single [`ParseError::LexFailure`]
//! covering the entire input. Isolating one bad file from the rest of a
//! multi-file run is [`crate::source`]'s job, not this module's.

pub mod context;
pub mod error;
pub mod handlers;
pub mod pending;
pub mod scan;
pub mod statement;
pub mod types;

use std::path::Path;

use crate::config::ParserConfig;
use crate::lexer::Lexer;
use crate::parser::context::HandlerCtx;
use crate::parser::error::{ParseError, ParseOutcome, ParseWarning};
use crate::parser::pending::PendingAttachments;
use crate::parser::statement::{detect_kind, split_statements, StatementKind};

pub use error::{ModelError, ParseOutcome as Outcome};

/// Parses one DDL source string end to end, returning the populated model
/// plus everything that went wrong along the way.
pub fn parse_sql(source: &str, config: &ParserConfig) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    let tokens = match Lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(source_err) => {
            let snippet: String = source.chars().take(80).collect();
            outcome.errors.push(ParseError::LexFailure {
                file: None,
                line: source_err.line(),
                snippet,
                source: source_err,
            });
            return outcome;
        }
    };

    let statements = split_statements(source, tokens);
    let mut pending = PendingAttachments::new();

    for statement in &statements {
        let kind = detect_kind(&statement.tokens);
        let mut ctx = HandlerCtx {
            config,
            model: &mut outcome.model,
            pending: &mut pending,
            warnings: &mut outcome.warnings,
            line: statement.line,
        };

        let result = dispatch(kind, &statement.tokens, &mut ctx);
        match result {
            Ok(()) => {}
            Err(err) => outcome.errors.push(err),
        }
    }

    let model_errors = pending.finalize(&mut outcome.model);
    for err in model_errors {
        outcome.warnings.push(ParseWarning::new(err.to_string(), None));
    }

    outcome.model.sort_canonical();
    outcome
}

/// Dispatches one statement's token slice to its handler. `Unknown` and
/// `DoBlock` are not failures — they are recorded as warnings, since most
/// schemas contain the odd statement (an ad hoc `GRANT`, a `DO` block
/// wrapping conditional DDL) this tool has no interest in modeling.
fn dispatch(kind: StatementKind, tokens: &[crate::lexer::Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    use handlers::*;

    match kind {
        StatementKind::CreateTable => table::handle_create_table(tokens, ctx),
        StatementKind::CreateIndex => index::handle_create_index(tokens, ctx),
        StatementKind::CreateView => view::handle_create_view(tokens, ctx),
        StatementKind::CreateMaterializedView => view::handle_create_materialized_view(tokens, ctx),
        StatementKind::CreateFunction => function::handle_create_function(tokens, ctx),
        StatementKind::CreateTrigger => trigger::handle_create_trigger(tokens, ctx),
        StatementKind::CreateExtension => extension::handle_create_extension(tokens, ctx),
        StatementKind::CreateType => ty::handle_create_type(tokens, ctx),
        StatementKind::CreateDomain => ty::handle_create_domain(tokens, ctx),
        StatementKind::CreateSequence => sequence::handle_create_sequence(tokens, ctx),
        StatementKind::CreateSchema => schema::handle_create_schema(tokens, ctx),
        StatementKind::AlterTable => table::handle_alter_table(tokens, ctx),
        StatementKind::CommentOn => comment::handle_comment_on(tokens, ctx),
        StatementKind::TimescaleCreateHypertable => timescale::handle_create_hypertable(tokens, ctx),
        StatementKind::TimescaleAddCompressionPolicy => timescale::handle_add_compression_policy(tokens, ctx),
        StatementKind::TimescaleAddRetentionPolicy => timescale::handle_add_retention_policy(tokens, ctx),
        StatementKind::TimescaleAddContinuousAggregatePolicy => {
            timescale::handle_add_continuous_aggregate_policy(tokens, ctx)
        }
        StatementKind::DoBlock => {
            ctx.warn("DO block skipped; conditional/dynamic DDL inside it is not modeled");
            Ok(())
        }
        StatementKind::Unknown => {
            let snippet: String = crate::parser::scan::tokens_to_text(tokens).chars().take(60).collect();
            ctx.warn(format!("unrecognized statement skipped: {snippet}"));
            Ok(())
        }
    }
}

/// Parses a single file, attaching its path to every error and warning so a
/// caller aggregating several files can tell them apart.
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParseOutcome, std::io::Error> {
    let source = std::fs::read_to_string(path)?;
    let mut outcome = parse_sql(&source, config);
    outcome.errors = outcome.errors.into_iter().map(|e| e.with_file(path.to_path_buf())).collect();
    outcome.warnings = outcome.warnings.into_iter().map(|w| w.with_file(path.to_path_buf())).collect();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomTypeKind;

    #[test]
    fn end_to_end_table_and_index() {
        let cfg = ParserConfig::default();
        let sql = "CREATE TABLE public.orders (id SERIAL PRIMARY KEY, customer_id INT);\n\
                   CREATE INDEX idx_orders_customer ON public.orders (customer_id);";
        let outcome = parse_sql(sql, &cfg);
        assert!(outcome.is_clean());
        assert_eq!(outcome.model.tables.len(), 1);
        // One index reified from the inline PRIMARY KEY (table.rs's
        // `reify_unique_index`) plus the explicit `CREATE INDEX`.
        assert_eq!(outcome.model.tables[0].indexes.len(), 2);
        // The SERIAL-owned sequence is implicit and never enters the
        // top-level `sequences` list; see `handle_create_table`.
        assert_eq!(outcome.model.sequences.len(), 0);
    }

    #[test]
    fn deferred_partition_resolves_across_statements() {
        let cfg = ParserConfig::default();
        let sql = "CREATE TABLE public.events_p0 PARTITION OF public.events FOR VALUES IN ('a');\n\
                   CREATE TABLE public.events (id INT, kind TEXT) PARTITION BY LIST (kind);";
        let outcome = parse_sql(sql, &cfg);
        assert!(outcome.is_clean());
        let child = outcome
            .model
            .find_table(&crate::model::QualifiedName::new("public", "events_p0"))
            .unwrap();
        assert!(child.partition_of.is_some());
    }

    #[test]
    fn unresolved_partition_becomes_warning() {
        let cfg = ParserConfig::default();
        let sql = "CREATE TABLE public.orphan PARTITION OF public.ghost FOR VALUES IN (1);";
        let outcome = parse_sql(sql, &cfg);
        assert!(outcome.is_clean());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].message.contains("ghost"));
    }

    #[test]
    fn unknown_statement_is_warning_not_error() {
        let cfg = ParserConfig::default();
        let outcome = parse_sql("GRANT SELECT ON ALL TABLES IN SCHEMA public TO app;", &cfg);
        assert!(outcome.is_clean());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn do_block_is_skipped_with_warning() {
        let cfg = ParserConfig::default();
        let outcome = parse_sql("DO $$ BEGIN CREATE TABLE t(id INT); END $$;", &cfg);
        assert!(outcome.is_clean());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.model.tables.is_empty());
    }

    #[test]
    fn lexer_failure_is_a_single_whole_source_error() {
        let cfg = ParserConfig::default();
        let outcome = parse_sql("CREATE TABLE t(id INT); 'unterminated", &cfg);
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(outcome.errors[0], ParseError::LexFailure { .. }));
    }

    #[test]
    fn full_timescale_pipeline() {
        let cfg = ParserConfig::default();
        let sql = "CREATE TABLE metrics (ts TIMESTAMPTZ NOT NULL, val DOUBLE PRECISION);\n\
                   SELECT create_hypertable('metrics', 'ts');\n\
                   SELECT add_retention_policy('metrics', drop_after => INTERVAL '30 days');";
        let outcome = parse_sql(sql, &cfg);
        assert!(outcome.is_clean());
        let ht = &outcome.model.hypertables[0];
        assert_eq!(ht.time_column, "ts");
        assert_eq!(ht.retention.as_ref().unwrap().drop_after, "30 days");
    }

    #[test]
    fn create_domain_dispatches_to_ty_handler() {
        let cfg = ParserConfig::default();
        let outcome = parse_sql("CREATE DOMAIN positive_int AS INTEGER CHECK (VALUE > 0);", &cfg);
        assert!(outcome.is_clean());
        assert_eq!(outcome.model.custom_types[0].kind, CustomTypeKind::Domain);
    }
}
