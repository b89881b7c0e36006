//! `CREATE SCHEMA [IF NOT EXISTS] name [AUTHORIZATION owner]` handler.

use crate::lexer::Token;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{match_keywords, skip_comments};

pub fn handle_create_schema(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["CREATE", "SCHEMA"]).ok_or_else(|| missing(ctx))?;
    i = skip_comments(tokens, i);
    if let Some(idx) = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]) {
        i = idx;
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx))?;
    ctx.model.ensure_namespace(name_tok.text);
    Ok(())
}

fn missing(ctx: &HandlerCtx) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE SCHEMA".to_string(),
        clause: "name".to_string(),
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
        handle_create_schema(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn creates_namespace() {
        let model = run("CREATE SCHEMA IF NOT EXISTS analytics");
        assert!(model.namespaces.iter().any(|n| n.name == "analytics"));
    }

    #[test]
    fn duplicate_schema_is_idempotent() {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        for _ in 0..2 {
            let tokens = Lexer::tokenize("CREATE SCHEMA analytics").unwrap();
            let mut ctx = HandlerCtx {
                config: &cfg,
                model: &mut model,
                pending: &mut pending,
                warnings: &mut warnings,
                line: 1,
            };
            handle_create_schema(&tokens, &mut ctx).unwrap();
        }
        assert_eq!(model.namespaces.len(), 1);
    }
}
