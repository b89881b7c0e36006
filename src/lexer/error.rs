//! Fatal lexer failure modes.

use thiserror::Error;

/// A fatal failure while scanning a single DDL source string.
///
/// The lexer is a pure function: on any of these conditions it stops and
/// returns the error instead of a token stream. Since tokenizing happens
/// once over the whole source before statement splitting, a lex error is
/// fatal for that entire source — isolating it down to one bad statement
/// or file is handled above this layer (see [`crate::parser`] and
/// [`crate::source`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("unterminated quoted identifier starting at line {line}, column {column}")]
    UnterminatedQuotedIdentifier { line: usize, column: usize },

    #[error("unterminated dollar-quoted string (tag `{tag}`) starting at line {line}, column {column}")]
    UnterminatedDollarQuote {
        tag: String,
        line: usize,
        column: usize,
    },

    #[error("unterminated block comment starting at line {line}, column {column}")]
    UnterminatedBlockComment { line: usize, column: usize },

    #[error("unknown character {ch:?} at line {line}, column {column}")]
    UnknownCharacter { ch: char, line: usize, column: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedString { line, .. }
            | LexError::UnterminatedQuotedIdentifier { line, .. }
            | LexError::UnterminatedDollarQuote { line, .. }
            | LexError::UnterminatedBlockComment { line, .. }
            | LexError::UnknownCharacter { line, .. } => *line,
        }
    }
}
