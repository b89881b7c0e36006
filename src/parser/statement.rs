//! Statement splitting and statement-kind detection.

use crate::lexer::{Token, TokenKind};
use crate::parser::scan::{is_kw, match_keywords, skip_comments};

/// One top-level statement: its token slice (owned, since the lexer borrows
/// from the original source and a `Statement` often outlives the per-file
/// loop that produced it), a verbatim SQL slice, and the 1-based line its
/// first token started on.
#[derive(Debug, Clone)]
pub struct Statement<'src> {
    pub tokens: Vec<Token<'src>>,
    pub sql: &'src str,
    pub line: usize,
}

/// Splits a full token stream (ending in `Eof`) into top-level statements.
/// A `Semicolon` token only terminates a statement at paren-depth 0;
/// comment-only segments between semicolons are dropped.
pub fn split_statements<'src>(source: &'src str, tokens: Vec<Token<'src>>) -> Vec<Statement<'src>> {
    let mut statements = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth -= 1,
            TokenKind::Semicolon if depth == 0 => {
                push_statement(&mut statements, source, &tokens, start, i + 1);
                start = i + 1;
            }
            TokenKind::Eof => {
                push_statement(&mut statements, source, &tokens, start, i);
            }
            _ => {}
        }
    }
    statements
}

fn push_statement<'src>(
    out: &mut Vec<Statement<'src>>,
    source: &'src str,
    tokens: &[Token<'src>],
    start: usize,
    end: usize,
) {
    if start >= end {
        return;
    }
    let slice = &tokens[start..end];
    if slice.iter().all(|t| t.kind == TokenKind::Comment) {
        return;
    }
    let first_real = slice.iter().find(|t| t.kind != TokenKind::Comment);
    let Some(first_real) = first_real else { return };
    let line = first_real.line;
    let sql_start = slice.first().map(|t| t.start).unwrap_or(0);
    let sql_end = slice.last().map(|t| t.end).unwrap_or(sql_start);
    out.push(Statement {
        tokens: slice.to_vec(),
        sql: &source[sql_start..sql_end.min(source.len())],
        line,
    });
}

/// The closed set of recognized statement kinds. A new kind must be added
/// here and in `detect_kind` together, which gives exhaustiveness guarantees
/// at every downstream `match` — per the design note preferring a closed
/// tagged union over a dynamic registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    CreateIndex,
    CreateView,
    CreateMaterializedView,
    CreateFunction,
    CreateTrigger,
    CreateExtension,
    CreateType,
    CreateDomain,
    CreateSequence,
    CreateSchema,
    AlterTable,
    CommentOn,
    TimescaleCreateHypertable,
    TimescaleAddCompressionPolicy,
    TimescaleAddRetentionPolicy,
    TimescaleAddContinuousAggregatePolicy,
    DoBlock,
    Unknown,
}

impl StatementKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::CreateView => "CREATE VIEW",
            StatementKind::CreateMaterializedView => "CREATE MATERIALIZED VIEW",
            StatementKind::CreateFunction => "CREATE FUNCTION",
            StatementKind::CreateTrigger => "CREATE TRIGGER",
            StatementKind::CreateExtension => "CREATE EXTENSION",
            StatementKind::CreateType => "CREATE TYPE",
            StatementKind::CreateDomain => "CREATE DOMAIN",
            StatementKind::CreateSequence => "CREATE SEQUENCE",
            StatementKind::CreateSchema => "CREATE SCHEMA",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::CommentOn => "COMMENT ON",
            StatementKind::TimescaleCreateHypertable => "SELECT create_hypertable(...)",
            StatementKind::TimescaleAddCompressionPolicy => "SELECT add_compression_policy(...)",
            StatementKind::TimescaleAddRetentionPolicy => "SELECT add_retention_policy(...)",
            StatementKind::TimescaleAddContinuousAggregatePolicy => {
                "SELECT add_continuous_aggregate_policy(...)"
            }
            StatementKind::DoBlock => "DO",
            StatementKind::Unknown => "<unknown>",
        }
    }
}

/// Detects the statement kind using the first 3-6 non-comment tokens,
/// matching on uppercased literals. A fallback text-prefix check covers
/// cases the token classifier can't settle (e.g. a `SELECT` call to a
/// TimescaleDB management function, which lexes as ordinary identifiers).
pub fn detect_kind(tokens: &[Token]) -> StatementKind {
    let p0 = skip_comments(tokens, 0);

    if is_kw(tokens, p0, "CREATE") {
        let mut i = skip_comments(tokens, p0 + 1);
        if is_kw(tokens, i, "OR") {
            i = match_keywords(tokens, i, &["OR", "REPLACE"]).unwrap_or(i);
        }
        if is_kw(tokens, i, "UNIQUE") {
            i = skip_comments(tokens, i + 1);
        }
        if is_kw(tokens, i, "TABLE") {
            return StatementKind::CreateTable;
        }
        if is_kw(tokens, i, "INDEX") {
            return StatementKind::CreateIndex;
        }
        if is_kw(tokens, i, "MATERIALIZED") {
            return StatementKind::CreateMaterializedView;
        }
        if is_kw(tokens, i, "VIEW") {
            return StatementKind::CreateView;
        }
        if is_kw(tokens, i, "FUNCTION") {
            return StatementKind::CreateFunction;
        }
        if is_kw(tokens, i, "TRIGGER") {
            return StatementKind::CreateTrigger;
        }
        if is_kw(tokens, i, "EXTENSION") {
            return StatementKind::CreateExtension;
        }
        if is_kw(tokens, i, "TYPE") {
            return StatementKind::CreateType;
        }
        if is_kw(tokens, i, "SEQUENCE") {
            return StatementKind::CreateSequence;
        }
        if is_kw(tokens, i, "SCHEMA") {
            return StatementKind::CreateSchema;
        }
        if is_kw(tokens, i, "DOMAIN") {
            return StatementKind::CreateDomain;
        }
        return StatementKind::Unknown;
    }

    if is_kw(tokens, p0, "ALTER") {
        let i = skip_comments(tokens, p0 + 1);
        if is_kw(tokens, i, "TABLE") {
            return StatementKind::AlterTable;
        }
        return StatementKind::Unknown;
    }

    if match_keywords(tokens, p0, &["COMMENT", "ON"]).is_some() {
        return StatementKind::CommentOn;
    }

    if is_kw(tokens, p0, "DO") {
        return StatementKind::DoBlock;
    }

    if is_kw(tokens, p0, "SELECT") {
        let i = skip_comments(tokens, p0 + 1);
        if let Some(name) = tokens.get(i) {
            return match name.text.to_ascii_lowercase().as_str() {
                "create_hypertable" => StatementKind::TimescaleCreateHypertable,
                "add_compression_policy" => StatementKind::TimescaleAddCompressionPolicy,
                "add_retention_policy" => StatementKind::TimescaleAddRetentionPolicy,
                "add_continuous_aggregate_policy" => {
                    StatementKind::TimescaleAddContinuousAggregatePolicy
                }
                _ => StatementKind::Unknown,
            };
        }
    }

    StatementKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn kind_of(sql: &str) -> StatementKind {
        let tokens = Lexer::tokenize(sql).unwrap();
        detect_kind(&tokens)
    }

    #[test]
    fn detects_create_table() {
        assert_eq!(kind_of("CREATE TABLE t(id INT)"), StatementKind::CreateTable);
    }

    #[test]
    fn detects_create_unique_index() {
        assert_eq!(
            kind_of("CREATE UNIQUE INDEX idx ON t(id)"),
            StatementKind::CreateIndex
        );
    }

    #[test]
    fn detects_create_or_replace_function() {
        assert_eq!(
            kind_of("CREATE OR REPLACE FUNCTION f() RETURNS INT AS $$ SELECT 1 $$ LANGUAGE sql"),
            StatementKind::CreateFunction
        );
    }

    #[test]
    fn detects_materialized_view() {
        assert_eq!(
            kind_of("CREATE MATERIALIZED VIEW v AS SELECT 1"),
            StatementKind::CreateMaterializedView
        );
    }

    #[test]
    fn detects_timescale_create_hypertable() {
        assert_eq!(
            kind_of("SELECT create_hypertable('t', 'ts')"),
            StatementKind::TimescaleCreateHypertable
        );
    }

    #[test]
    fn unrecognized_select_is_unknown() {
        assert_eq!(kind_of("SELECT 1"), StatementKind::Unknown);
    }

    #[test]
    fn splits_on_top_level_semicolons_only() {
        let sql = "CREATE TABLE t(a TEXT DEFAULT 'x;y'); CREATE TABLE u(a INT);";
        let tokens = Lexer::tokenize(sql).unwrap();
        let stmts = split_statements(sql, tokens);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].sql.contains("'x;y'"));
    }

    #[test]
    fn skips_comment_only_segments() {
        let sql = "-- just a comment\n; CREATE TABLE t(a INT);";
        let tokens = Lexer::tokenize(sql).unwrap();
        let stmts = split_statements(sql, tokens);
        assert_eq!(stmts.len(), 1);
    }
}
