//! Shared token-scanning primitives used by every statement handler.
//!
//! Handlers never walk raw characters; they work over a `&[Token]` slice
//! produced by the lexer and composed by these primitives, per the design
//! note that keeps nesting-awareness ("strings and dollar-quotes are already
//! atomic tokens") in one place.

use crate::lexer::{Token, TokenKind};

/// Index of the next non-comment token at or after `from`, or `tokens.len()`
/// if none remains.
pub fn skip_comments(tokens: &[Token], from: usize) -> usize {
    let mut i = from;
    while i < tokens.len() && tokens[i].kind == TokenKind::Comment {
        i += 1;
    }
    i
}

/// True if the token at `pos` (after skipping comments) is the keyword
/// `word`, case-insensitively.
pub fn is_kw(tokens: &[Token], pos: usize, word: &str) -> bool {
    let pos = skip_comments(tokens, pos);
    tokens.get(pos).map(|t| t.is_keyword(word)).unwrap_or(false)
}

pub fn is_kind(tokens: &[Token], pos: usize, kind: TokenKind) -> bool {
    let pos = skip_comments(tokens, pos);
    tokens.get(pos).map(|t| t.kind == kind).unwrap_or(false)
}

/// Matches a sequence of keywords starting at `pos` (skipping comments
/// between each). Returns the index just past the matched sequence, or
/// `None`.
pub fn match_keywords(tokens: &[Token], pos: usize, words: &[&str]) -> Option<usize> {
    let mut i = pos;
    for word in words {
        i = skip_comments(tokens, i);
        if !tokens.get(i)?.is_keyword(word) {
            return None;
        }
        i += 1;
    }
    Some(i)
}

/// Finds the index of the token matching the opening paren/bracket at
/// `open_pos`, tracking nesting depth. `open_pos` must itself be an
/// `LParen`/`LBracket` token. Returns `None` if unbalanced (should not
/// happen for well-lexed input — a statement with unbalanced parens simply
/// runs to end of statement, which callers treat as a missing-clause error).
pub fn find_matching_close(tokens: &[Token], open_pos: usize) -> Option<usize> {
    let open_kind = tokens.get(open_pos)?.kind;
    let close_kind = match open_kind {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBracket => TokenKind::RBracket,
        _ => return None,
    };
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate().skip(open_pos) {
        if tok.kind == open_kind {
            depth += 1;
        } else if tok.kind == close_kind {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Finds the next `LParen` at or after `from` that is not inside a deeper
/// nesting level, returning its index.
pub fn find_next_lparen(tokens: &[Token], from: usize) -> Option<usize> {
    tokens[from..]
        .iter()
        .position(|t| t.kind == TokenKind::LParen)
        .map(|i| i + from)
}

/// Finds the index of the next token (at paren-depth 0 relative to `from`)
/// whose uppercased literal matches one of `keywords`. Returns
/// `tokens.len()` if none is found before the end of the slice.
pub fn find_next_keyword_at_depth0(tokens: &[Token], from: usize, keywords: &[&str]) -> usize {
    let mut depth = 0i32;
    for i in from..tokens.len() {
        match tokens[i].kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth -= 1,
            TokenKind::Keyword if depth == 0 => {
                if keywords.iter().any(|k| tokens[i].is_keyword(k)) {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

/// Splits `tokens` on top-level commas (respecting paren/bracket nesting),
/// returning the non-comment token slices between separators. An empty
/// input yields an empty vec (not a vec containing one empty slice).
pub fn split_by_comma<'t, 'src>(tokens: &'t [Token<'src>]) -> Vec<&'t [Token<'src>]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth -= 1,
            TokenKind::Comma if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
        .into_iter()
        .map(|part| trim_comments(part))
        .filter(|part| !part.is_empty())
        .collect()
}

fn trim_comments<'t, 'src>(tokens: &'t [Token<'src>]) -> &'t [Token<'src>] {
    let start = tokens.iter().position(|t| t.kind != TokenKind::Comment).unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Comment)
        .map(|i| i + 1)
        .unwrap_or(0);
    if start >= end {
        &[]
    } else {
        &tokens[start..end]
    }
}

/// Renders a token slice back to a single-spaced, whitespace-normalized
/// source string — used to reconstruct verbatim definitions (index
/// predicates, check expressions, FOR VALUES clauses, ...).
pub fn tokens_to_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_end: Option<usize> = None;
    for tok in tokens {
        if tok.kind == TokenKind::Comment {
            continue;
        }
        if let Some(prev) = prev_end {
            let needs_space = !matches!(
                tok.kind,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::Dot | TokenKind::Colon
            ) && prev != tok.start;
            let prev_was_open = out.ends_with('(') || out.ends_with('[');
            let prev_was_dot = out.ends_with('.');
            if needs_space && !prev_was_open && !prev_was_dot && tok.kind != TokenKind::Semicolon {
                out.push(' ');
            }
        }
        out.push_str(tok.text);
        prev_end = Some(tok.end);
    }
    out.trim().to_string()
}

/// Collects tokens from `from` up to (but not including) the first
/// depth-0 token whose literal matches one of `stop_words`, returning the
/// joined text and the index of the stopping token (or `tokens.len()`).
pub fn collect_literal_until<'t, 'src>(
    tokens: &'t [Token<'src>],
    from: usize,
    stop_words: &[&str],
) -> (String, usize) {
    let stop = find_next_keyword_at_depth0(tokens, from, stop_words);
    (tokens_to_text(&tokens[from..stop]), stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn split_by_comma_respects_nesting() {
        let toks = Lexer::tokenize("a, b(c, d), e").unwrap();
        let parts = split_by_comma(&toks[..toks.len() - 1]); // drop EOF
        assert_eq!(parts.len(), 3);
        assert_eq!(tokens_to_text(parts[1]), "b(c, d)");
    }

    #[test]
    fn find_matching_close_handles_nesting() {
        let toks = Lexer::tokenize("(a (b) c)").unwrap();
        let close = find_matching_close(&toks, 0).unwrap();
        assert_eq!(toks[close].kind, TokenKind::RParen);
        assert_eq!(close, toks.len() - 2); // last real token before EOF
    }

    #[test]
    fn tokens_to_text_reconstructs_parenthesized_call() {
        let toks = Lexer::tokenize("count(*)").unwrap();
        assert_eq!(tokens_to_text(&toks[..toks.len() - 1]), "count(*)");
    }
}
