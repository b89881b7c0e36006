//! Hand-written DDL lexer.
//!
//! Turns a single DDL source string into a flat token stream terminated by
//! `TokenKind::Eof`. The lexer is a pure function of its input: it holds no
//! state between calls and performs no I/O. See [`Lexer::tokenize`].

pub mod error;
pub mod keywords;
pub mod token;

pub use error::LexError;
pub use token::{Token, TokenKind};

/// Scans a DDL source string into tokens.
pub struct Lexer<'src> {
    src: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source, returning the token stream (ending in
    /// `Eof`) or the first fatal lex error encountered.
    pub fn tokenize(src: &'src str) -> Result<Vec<Token<'src>>, LexError> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(b, _)| *b)
            .unwrap_or(self.src.len())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Reposition the cursor at the given byte offset, recomputing line and
    /// column by counting newlines consumed since the current position. Used
    /// after scanning ahead via raw string search (dollar-quote tag/body
    /// matching), where re-walking char by char would be wasteful.
    fn seek_to_byte(&mut self, target_byte: usize) {
        while self.byte_offset() < target_byte && self.pos < self.len() {
            self.advance();
        }
        // target_byte == src.len() lands pos == len(), which is EOF — fine.
    }

    fn is_ident_start(ch: char) -> bool {
        ch == '_' || ch.is_alphabetic() || !ch.is_ascii()
    }

    fn is_ident_part(ch: char) -> bool {
        Self::is_ident_start(ch) || ch.is_ascii_digit()
    }

    fn is_operator_char(ch: char) -> bool {
        matches!(
            ch,
            '+' | '-' | '*' | '/' | '<' | '>' | '=' | '~' | '!' | '@' | '#' | '%' | '^' | '&'
                | '|' | '`' | '?'
        )
    }

    fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_whitespace();

        let start = self.byte_offset();
        let start_line = self.line;
        let start_col = self.column;

        let Some(ch) = self.current() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                start,
                end: start,
                line: start_line,
                column: start_col,
            });
        };

        // Line comment.
        if ch == '-' && self.peek_at(1) == Some('-') {
            return Ok(self.scan_line_comment(start, start_line, start_col));
        }

        // Block comment (nestable).
        if ch == '/' && self.peek_at(1) == Some('*') {
            return self.scan_block_comment(start, start_line, start_col);
        }

        if ch == '"' {
            return self.scan_quoted_identifier(start, start_line, start_col);
        }

        if ch == '\'' {
            return self.scan_string_literal(start, start_line, start_col);
        }

        if ch == '$' {
            return self.scan_dollar_or_operator(start, start_line, start_col);
        }

        if Self::is_ident_start(ch) {
            return Ok(self.scan_identifier(start, start_line, start_col));
        }

        if ch.is_ascii_digit() {
            return Ok(self.scan_number(start, start_line, start_col));
        }

        // Multi-character operators (two-byte lookahead).
        if let Some(next) = self.peek_at(1) {
            let two = match (ch, next) {
                ('<', '>') | ('!', '=') | ('<', '=') | ('>', '=') => true,
                _ => false,
            };
            if two {
                self.advance();
                self.advance();
                return Ok(Token {
                    kind: TokenKind::Operator,
                    text: &self.src[start..self.byte_offset()],
                    start,
                    end: self.byte_offset(),
                    line: start_line,
                    column: start_col,
                });
            }
        }

        let single = match ch {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            '.' => Some(TokenKind::Dot),
            ':' => Some(TokenKind::Colon),
            _ => None,
        };

        if let Some(kind) = single {
            self.advance();
            return Ok(Token {
                kind,
                text: &self.src[start..self.byte_offset()],
                start,
                end: self.byte_offset(),
                line: start_line,
                column: start_col,
            });
        }

        if Self::is_operator_char(ch) {
            self.advance();
            return Ok(Token {
                kind: TokenKind::Operator,
                text: &self.src[start..self.byte_offset()],
                start,
                end: self.byte_offset(),
                line: start_line,
                column: start_col,
            });
        }

        Err(LexError::UnknownCharacter {
            ch,
            line: start_line,
            column: start_col,
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_line_comment(&mut self, start: usize, line: usize, column: usize) -> Token<'src> {
        self.advance(); // '-'
        self.advance(); // '-'
        while let Some(ch) = self.current() {
            if ch == '\n' {
                self.advance(); // include the newline in the comment span
                break;
            }
            self.advance();
        }
        Token {
            kind: TokenKind::Comment,
            text: &self.src[start..self.byte_offset()],
            start,
            end: self.byte_offset(),
            line,
            column,
        }
    }

    fn scan_block_comment(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'src>, LexError> {
        self.advance(); // '/'
        self.advance(); // '*'
        let mut depth = 1usize;
        loop {
            match (self.current(), self.peek_at(1)) {
                (None, _) => {
                    return Err(LexError::UnterminatedBlockComment { line, column });
                }
                (Some('/'), Some('*')) => {
                    depth += 1;
                    self.advance();
                    self.advance();
                }
                (Some('*'), Some('/')) => {
                    depth -= 1;
                    self.advance();
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::Comment,
            text: &self.src[start..self.byte_offset()],
            start,
            end: self.byte_offset(),
            line,
            column,
        })
    }

    fn scan_quoted_identifier(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'src>, LexError> {
        self.advance(); // opening '"'
        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedQuotedIdentifier { line, column }),
                Some('"') => {
                    self.advance();
                    // A doubled `""` is an escaped quote, not a terminator.
                    if self.current() == Some('"') {
                        self.advance();
                        continue;
                    }
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::QuotedIdentifier,
            text: &self.src[start..self.byte_offset()],
            start,
            end: self.byte_offset(),
            line,
            column,
        })
    }

    fn scan_string_literal(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'src>, LexError> {
        self.advance(); // opening '\''
        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString { line, column }),
                Some('\'') => {
                    self.advance();
                    if self.current() == Some('\'') {
                        self.advance();
                        continue;
                    }
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::String,
            text: &self.src[start..self.byte_offset()],
            start,
            end: self.byte_offset(),
            line,
            column,
        })
    }

    /// Handles a `$` at the current position: either a well-formed
    /// dollar-quote tag (`$tag$ ... $tag$`, possibly `$$ ... $$`) or, if the
    /// tag is ill-formed, a single bare `$` operator token.
    fn scan_dollar_or_operator(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'src>, LexError> {
        // Probe forward (without mutating lexer state) for a closing `$`
        // preceded only by identifier characters.
        let mut probe = self.pos + 1;
        while let Some((_, c)) = self.chars.get(probe) {
            if *c == '$' {
                break;
            }
            if Self::is_ident_part(*c) {
                probe += 1;
                continue;
            }
            // Non-identifier character before the closing `$` — ill-formed tag.
            probe = usize::MAX;
            break;
        }

        let closing_is_dollar = probe != usize::MAX && self.chars.get(probe).map(|(_, c)| *c) == Some('$');

        if !closing_is_dollar {
            // Bare `$` in an expression: emit as an Operator and continue.
            self.advance();
            return Ok(Token {
                kind: TokenKind::Operator,
                text: &self.src[start..self.byte_offset()],
                start,
                end: self.byte_offset(),
                line,
                column,
            });
        }

        let tag_end_byte = self
            .chars
            .get(probe)
            .map(|(b, c)| b + c.len_utf8())
            .unwrap_or(self.src.len());
        let tag = &self.src[start..tag_end_byte];

        // Find the next occurrence of the identical tag after the opening one.
        let body_start = tag_end_byte;
        let rest = &self.src[body_start..];
        match rest.find(tag) {
            None => Err(LexError::UnterminatedDollarQuote {
                tag: tag.to_string(),
                line,
                column,
            }),
            Some(rel_idx) => {
                let end = body_start + rel_idx + tag.len();
                self.seek_to_byte(end);
                Ok(Token {
                    kind: TokenKind::String,
                    text: &self.src[start..end],
                    start,
                    end,
                    line,
                    column,
                })
            }
        }
    }

    fn scan_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'src> {
        self.advance();
        while let Some(ch) = self.current() {
            if Self::is_ident_part(ch) {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.src[start..self.byte_offset()];
        let kind = if keywords::is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token {
            kind,
            text,
            start,
            end: self.byte_offset(),
            line,
            column,
        }
    }

    fn scan_number(&mut self, start: usize, line: usize, column: usize) -> Token<'src> {
        let mut seen_dot = false;
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !seen_dot && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit())
            {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Number,
            text: &self.src[start..self.byte_offset()],
            start,
            end: self.byte_offset(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tiles_simple_create_table() {
        let toks = Lexer::tokenize("CREATE TABLE t(id INT);").unwrap();
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
        // No gaps/overlaps: each token's start equals the previous token's end
        // once whitespace is accounted for (start >= previous end).
        for pair in toks.windows(2) {
            assert!(pair[1].start >= pair[0].end);
        }
    }

    #[test]
    fn keyword_reclassification() {
        let toks = Lexer::tokenize("CREATE TABLE orders").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[1].kind, TokenKind::Keyword);
        assert_eq!(toks[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn quoted_identifier_with_doubled_quote() {
        let toks = Lexer::tokenize(r#""My""Table""#).unwrap();
        assert_eq!(toks[0].kind, TokenKind::QuotedIdentifier);
        assert_eq!(toks[0].text, r#""My""Table""#);
    }

    #[test]
    fn string_literal_with_doubled_quote() {
        let toks = Lexer::tokenize("'it''s'").unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, "'it''s'");
    }

    #[test]
    fn dollar_quoted_body() {
        let toks = Lexer::tokenize("$$select 1;$$").unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, "$$select 1;$$");
    }

    #[test]
    fn dollar_quoted_body_with_tag() {
        let toks = Lexer::tokenize("$body$ hi $body$").unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, "$body$ hi $body$");
    }

    #[test]
    fn bare_dollar_is_operator() {
        // `$1` is a positional-parameter-like token in expressions; the tag
        // scan fails to find a closing `$` so it is just an operator + number.
        let toks = Lexer::tokenize("$1").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Operator);
        assert_eq!(toks[0].text, "$");
        assert_eq!(toks[1].kind, TokenKind::Number);
    }

    #[test]
    fn unterminated_dollar_quote_mismatched_tag() {
        let err = Lexer::tokenize("$tag$ body $other$").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedDollarQuote { .. }));
    }

    #[test]
    fn nested_block_comment_is_single_token() {
        let toks = Lexer::tokenize("/* outer /* inner */ still outer */ SELECT").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Comment);
        assert_eq!(toks[1].kind, TokenKind::Keyword);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let err = Lexer::tokenize("/* never closes").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedBlockComment { .. }));
    }

    #[test]
    fn unterminated_string_errors() {
        let err = Lexer::tokenize("'never closes").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn multi_char_operators() {
        assert_eq!(kinds("<> != <= >="), vec![
            TokenKind::Operator,
            TokenKind::Operator,
            TokenKind::Operator,
            TokenKind::Operator,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn numeric_literal_with_single_dot() {
        let toks = Lexer::tokenize("3.14").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].text, "3.14");
    }

    #[test]
    fn line_and_column_tracking_across_newlines() {
        let toks = Lexer::tokenize("CREATE\nTABLE").unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[1].column, 1);
    }

    #[test]
    fn non_ascii_identifier() {
        let toks = Lexer::tokenize("café").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].text, "café");
    }

    #[test]
    fn unknown_character_errors() {
        let err = Lexer::tokenize("\u{0001}").unwrap_err();
        assert!(matches!(err, LexError::UnknownCharacter { .. }));
    }

    #[test]
    fn token_ranges_tile_without_overlap() {
        let src = "CREATE TABLE app.users(id UUID PRIMARY KEY, email TEXT NOT NULL UNIQUE);";
        let toks = Lexer::tokenize(src).unwrap();
        let mut last_end = 0;
        for t in &toks {
            assert!(t.start >= last_end);
            last_end = t.end;
        }
        assert_eq!(last_end, src.len());
    }
}
