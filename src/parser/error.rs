//! Parse-time error and warning types.
//!
//! Two separate streams, per the design: `ParseError` for one statement that
//! failed to parse outright (accumulated, never aborts the session), and
//! `ParseWarning` for non-fatal conditions noted while otherwise succeeding.

use std::path::PathBuf;
use thiserror::Error;

use crate::lexer::LexError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("{file:?}:{line}: lex failure in statement: {source}\n  {snippet}")]
    LexFailure {
        file: Option<PathBuf>,
        line: usize,
        snippet: String,
        #[source]
        source: LexError,
    },

    #[error("{file:?}:{line}: {statement_kind} is missing required clause `{clause}`\n  {snippet}")]
    MissingClause {
        file: Option<PathBuf>,
        line: usize,
        statement_kind: String,
        clause: String,
        snippet: String,
    },

    #[error("{file:?}:{line}: {target_kind} references unknown target `{name}`\n  {snippet}")]
    UnknownTarget {
        file: Option<PathBuf>,
        line: usize,
        target_kind: String,
        name: String,
        snippet: String,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::LexFailure { line, .. }
            | ParseError::MissingClause { line, .. }
            | ParseError::UnknownTarget { line, .. } => *line,
        }
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        match &mut self {
            ParseError::LexFailure { file, .. }
            | ParseError::MissingClause { file, .. }
            | ParseError::UnknownTarget { file, .. } => *file = Some(path),
        }
        self
    }
}

/// A non-fatal condition noted during parsing: an unrecognized statement
/// kind, an index/comment targeting an object not (yet) in the model, a
/// `DO` block containing DDL, or function arguments that could not be fully
/// parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
}

impl ParseWarning {
    pub fn new(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line,
        }
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file = Some(path);
        self
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}: {}", file.display(), line, self.message),
            (Some(file), None) => write!(f, "{}: {}", file.display(), self.message),
            (None, Some(line)) => write!(f, "line {}: {}", line, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// A fatal, per-statement-class misuse distinct from a recoverable warning
/// — reserved for callers of handler-level APIs outside the main dispatch
/// loop (e.g. `finalize()` on an unresolvable deferred partition).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("partition `{child}` references unknown parent table `{parent}`")]
    UnresolvedPartition { child: String, parent: String },
}

/// The result of a full parse session: the populated model plus whatever
/// errors and warnings accumulated along the way. Callers decide whether a
/// non-empty `errors` constitutes a failed parse — the differ will still
/// run on an incomplete model.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub model: crate::model::SchemaModel,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
