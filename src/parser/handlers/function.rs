//! `CREATE [OR REPLACE] FUNCTION` handler.

use crate::lexer::{Token, TokenKind};
use crate::model::{ArgMode, Function, FunctionArgument, Volatility};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{
    collect_literal_until, find_matching_close, find_next_lparen, is_kw, match_keywords,
    skip_comments, split_by_comma, tokens_to_text,
};

pub fn handle_create_function(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let full_definition = tokens_to_text(&tokens[..tokens.len().saturating_sub(1)]);

    let mut i = skip_comments(tokens, 0);
    i += 1; // CREATE
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "OR") {
        i = match_keywords(tokens, i, &["OR", "REPLACE"]).unwrap_or(i);
    }
    i = match_keywords(tokens, i, &["FUNCTION"]).ok_or_else(|| missing(ctx, "name"))?;
    i = skip_comments(tokens, i);
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;

    let open = find_next_lparen(tokens, i).ok_or_else(|| missing(ctx, "argument list"))?;
    let close = find_matching_close(tokens, open).ok_or_else(|| missing(ctx, "argument list"))?;
    let arguments = split_by_comma(&tokens[open + 1..close]).into_iter().map(parse_argument).collect();
    let mut rest = skip_comments(tokens, close + 1);

    let mut return_type = String::new();
    if is_kw(tokens, rest, "RETURNS") {
        rest += 1;
        let (text, next) = collect_literal_until(
            tokens,
            rest,
            &["LANGUAGE", "AS", "IMMUTABLE", "STABLE", "VOLATILE", "STRICT", "SECURITY"],
        );
        return_type = text;
        rest = next;
    }

    let mut language = String::new();
    let mut volatility = Volatility::Volatile;
    let mut is_strict = false;
    let mut is_security_definer = false;
    let mut body = String::new();

    loop {
        rest = skip_comments(tokens, rest);
        if is_kw(tokens, rest, "LANGUAGE") {
            rest += 1;
            rest = skip_comments(tokens, rest);
            if let Some(tok) = tokens.get(rest) {
                language = tok.text.to_lowercase();
                rest += 1;
            }
        } else if is_kw(tokens, rest, "IMMUTABLE") {
            volatility = Volatility::Immutable;
            rest += 1;
        } else if is_kw(tokens, rest, "STABLE") {
            volatility = Volatility::Stable;
            rest += 1;
        } else if is_kw(tokens, rest, "VOLATILE") {
            volatility = Volatility::Volatile;
            rest += 1;
        } else if is_kw(tokens, rest, "STRICT") {
            is_strict = true;
            rest += 1;
        } else if match_keywords(tokens, rest, &["RETURNS", "NULL", "ON", "NULL", "INPUT"]).is_some() {
            is_strict = true;
            rest = match_keywords(tokens, rest, &["RETURNS", "NULL", "ON", "NULL", "INPUT"]).unwrap();
        } else if match_keywords(tokens, rest, &["SECURITY", "DEFINER"]).is_some() {
            is_security_definer = true;
            rest = match_keywords(tokens, rest, &["SECURITY", "DEFINER"]).unwrap();
        } else if match_keywords(tokens, rest, &["SECURITY", "INVOKER"]).is_some() {
            is_security_definer = false;
            rest = match_keywords(tokens, rest, &["SECURITY", "INVOKER"]).unwrap();
        } else if is_kw(tokens, rest, "AS") {
            let (extracted, next) = extract_body(tokens, rest + 1);
            body = extracted;
            rest = next;
        } else {
            break;
        }
    }

    ctx.model.upsert_function(Function {
        name,
        arguments,
        return_type,
        language,
        body,
        volatility,
        is_strict,
        is_security_definer,
        definition: full_definition,
        comment: None,
    });
    Ok(())
}

/// Parses one argument: `(IN|OUT|INOUT|VARIADIC)? name? type [DEFAULT expr]`.
fn parse_argument(part: &[Token]) -> FunctionArgument {
    let mut i = 0;
    let mut mode = ArgMode::In;
    if let Some(tok) = part.first() {
        if tok.is_keyword("OUT") {
            mode = ArgMode::Out;
            i += 1;
        } else if tok.is_keyword("INOUT") {
            mode = ArgMode::InOut;
            i += 1;
        } else if tok.is_keyword("VARIADIC") {
            mode = ArgMode::Variadic;
            i += 1;
        } else if tok.is_keyword("IN") {
            mode = ArgMode::In;
            i += 1;
        }
    }

    // An argument name precedes the type only when the following token is
    // not itself a type-looking keyword the way `parse_type` would consume;
    // a simple heuristic: if there are at least two remaining tokens and the
    // first is a plain identifier (not a type keyword), treat it as the name.
    let mut name = None;
    if part.len() > i + 1 && part[i].kind == TokenKind::Identifier {
        name = Some(crate::normalize::normalize_identifier(part[i].text));
        i += 1;
    }

    let (type_info, mut j) = crate::parser::types::parse_type(part, i);
    let mut data_type = type_info.base;
    if let Some(n) = type_info.max_length.or(type_info.precision) {
        data_type = format!("{data_type}({n}{})", type_info.scale.map(|s| format!(",{s}")).unwrap_or_default());
    }
    if type_info.is_array {
        data_type.push_str("[]");
    }

    let mut default = None;
    j = skip_comments(part, j);
    if is_kw(part, j, "DEFAULT") || is_kw(part, j, "=") {
        let (expr, _) = collect_literal_until(part, j + 1, &[]);
        default = Some(expr);
    }

    FunctionArgument {
        mode,
        name,
        data_type,
        default,
    }
}

/// Prefers the outermost dollar-quoted body; falls back to a plain `'...'`
/// string literal.
fn extract_body(tokens: &[Token], from: usize) -> (String, usize) {
    let from = skip_comments(tokens, from);
    if let Some(tok) = tokens.get(from) {
        if tok.kind == TokenKind::String {
            let inner = strip_quoting(tok.text);
            return (inner, from + 1);
        }
    }
    (String::new(), from)
}

/// Strips a dollar-quote tag (`$tag$ ... $tag$`) or single-quote wrapping
/// (with `''` unescaped) from a lexed string-literal token's raw text.
fn strip_quoting(raw: &str) -> String {
    if raw.starts_with('$') {
        if let Some(rest) = raw.strip_prefix('$') {
            if let Some(tag_end) = rest.find('$') {
                let tag_len = tag_end + 2; // both `$`s
                if raw.len() >= tag_len * 2 {
                    return raw[tag_len..raw.len() - tag_len].to_string();
                }
            }
        }
        raw.to_string()
    } else if raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2 {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE FUNCTION".to_string(),
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
        handle_create_function(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn dollar_quoted_body_and_volatility() {
        let model = run(
            "CREATE OR REPLACE FUNCTION public.touch_updated_at() RETURNS TRIGGER AS $$ \
             BEGIN NEW.updated_at = now(); RETURN NEW; END; $$ LANGUAGE plpgsql STABLE",
        );
        let f = &model.functions[0];
        assert_eq!(f.language, "plpgsql");
        assert_eq!(f.volatility, Volatility::Stable);
        assert!(f.body.contains("NEW.updated_at"));
    }

    #[test]
    fn strict_and_security_definer() {
        let model = run(
            "CREATE FUNCTION f(a INT) RETURNS INT AS 'select 1' LANGUAGE sql STRICT SECURITY DEFINER",
        );
        let f = &model.functions[0];
        assert!(f.is_strict);
        assert!(f.is_security_definer);
        assert_eq!(f.body, "select 1");
    }

    #[test]
    fn argument_modes_and_defaults() {
        let model = run(
            "CREATE FUNCTION f(IN a INT, OUT b TEXT, c INT DEFAULT 5) RETURNS void AS 'x' LANGUAGE sql",
        );
        let args = &model.functions[0].arguments;
        assert_eq!(args[0].mode, ArgMode::In);
        assert_eq!(args[1].mode, ArgMode::Out);
        assert_eq!(args[2].default.as_deref(), Some("5"));
    }

    #[test]
    fn signature_distinguishes_overloads() {
        let model1 = run("CREATE FUNCTION f(a INT) RETURNS void AS 'x' LANGUAGE sql");
        assert_eq!(model1.functions[0].signature(), "public.f(INTEGER)");
    }
}
