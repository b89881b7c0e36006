//! `CREATE TRIGGER` handler.

use crate::lexer::Token;
use crate::model::{Trigger, TriggerEvent, TriggerTiming};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::ParseError;
use crate::parser::scan::{find_matching_close, is_kw, match_keywords, skip_comments};

/// `CREATE TRIGGER name (BEFORE|AFTER|INSTEAD OF) events ON table
/// [FOR EACH (ROW|STATEMENT)] [WHEN (expr)] EXECUTE (FUNCTION|PROCEDURE)
/// ref(args?)`
pub fn handle_create_trigger(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["CREATE", "TRIGGER"]).ok_or_else(|| missing(ctx, "name"))?;
    i = skip_comments(tokens, i);
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "name"))?;
    let name = crate::normalize::normalize_identifier(name_tok.text);
    i += 1;
    i = skip_comments(tokens, i);

    let timing = if is_kw(tokens, i, "BEFORE") {
        i += 1;
        TriggerTiming::Before
    } else if is_kw(tokens, i, "AFTER") {
        i += 1;
        TriggerTiming::After
    } else if let Some(idx) = match_keywords(tokens, i, &["INSTEAD", "OF"]) {
        i = idx;
        TriggerTiming::InsteadOf
    } else {
        return Err(missing(ctx, "BEFORE|AFTER|INSTEAD OF"));
    };

    let mut events = Vec::new();
    loop {
        i = skip_comments(tokens, i);
        let event = match tokens.get(i) {
            Some(t) if t.is_keyword("INSERT") => Some(TriggerEvent::Insert),
            Some(t) if t.is_keyword("UPDATE") => Some(TriggerEvent::Update),
            Some(t) if t.is_keyword("DELETE") => Some(TriggerEvent::Delete),
            Some(t) if t.is_keyword("TRUNCATE") => Some(TriggerEvent::Truncate),
            _ => None,
        };
        let Some(event) = event else { break };
        events.push(event);
        i += 1;
        i = skip_comments(tokens, i);
        if is_kw(tokens, i, "OR") {
            i += 1;
        } else if is_kw(tokens, i, "OF") {
            // UPDATE OF col1, col2 — column list not modeled, skip to ON.
            while i < tokens.len() && !is_kw(tokens, i, "ON") {
                i += 1;
            }
            break;
        } else {
            break;
        }
    }

    i = match_keywords(tokens, i, &["ON"]).ok_or_else(|| missing(ctx, "ON table"))?;
    i = skip_comments(tokens, i);
    let table_tok = tokens.get(i).ok_or_else(|| missing(ctx, "table"))?;
    let table = split_qualified_name(table_tok.text, &ctx.default_schema());
    i += 1;

    let mut for_each_row = false;
    let mut when_predicate = None;
    loop {
        i = skip_comments(tokens, i);
        if let Some(idx) = match_keywords(tokens, i, &["FOR", "EACH", "ROW"]) {
            for_each_row = true;
            i = idx;
        } else if let Some(idx) = match_keywords(tokens, i, &["FOR", "EACH", "STATEMENT"]) {
            for_each_row = false;
            i = idx;
        } else if let Some(idx) = match_keywords(tokens, i, &["FOR", "ROW"]) {
            for_each_row = true;
            i = idx;
        } else if is_kw(tokens, i, "WHEN") {
            let open = i + 1;
            if let Some(close) = find_matching_close(tokens, open) {
                when_predicate = Some(crate::parser::scan::tokens_to_text(&tokens[open + 1..close]));
                i = close + 1;
            } else {
                break;
            }
        } else {
            break;
        }
    }

    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "EXECUTE") {
        i += 1;
        i = skip_comments(tokens, i);
        if is_kw(tokens, i, "FUNCTION") || is_kw(tokens, i, "PROCEDURE") {
            i += 1;
        }
    }
    i = skip_comments(tokens, i);
    let func_tok = tokens.get(i).ok_or_else(|| missing(ctx, "EXECUTE FUNCTION"))?;
    let function = split_qualified_name(func_tok.text, &table.schema);

    ctx.model.upsert_trigger(Trigger {
        name,
        table,
        timing,
        events,
        for_each_row,
        when_predicate,
        function,
        comment: None,
    });
    Ok(())
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE TRIGGER".to_string(),
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
        handle_create_trigger(&tokens, &mut ctx).unwrap();
        model
    }

    #[test]
    fn before_insert_or_update_for_each_row() {
        let model = run(
            "CREATE TRIGGER trg_touch BEFORE INSERT OR UPDATE ON public.users \
             FOR EACH ROW EXECUTE FUNCTION touch_updated_at()",
        );
        let t = &model.triggers[0];
        assert_eq!(t.timing, TriggerTiming::Before);
        assert_eq!(t.events, vec![TriggerEvent::Insert, TriggerEvent::Update]);
        assert!(t.for_each_row);
        assert_eq!(t.function.name, "touch_updated_at");
    }

    #[test]
    fn when_predicate_captured() {
        let model = run(
            "CREATE TRIGGER trg_audit AFTER UPDATE ON t FOR EACH ROW \
             WHEN (OLD.status IS DISTINCT FROM NEW.status) EXECUTE PROCEDURE log_change()",
        );
        assert!(model.triggers[0].when_predicate.as_ref().unwrap().contains("DISTINCT"));
    }

    #[test]
    fn same_name_different_table_does_not_collide() {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        for sql in [
            "CREATE TRIGGER trg BEFORE INSERT ON a FOR EACH ROW EXECUTE FUNCTION f()",
            "CREATE TRIGGER trg BEFORE INSERT ON b FOR EACH ROW EXECUTE FUNCTION f()",
        ] {
            let tokens = Lexer::tokenize(sql).unwrap();
            let mut ctx = HandlerCtx {
                config: &cfg,
                model: &mut model,
                pending: &mut pending,
                warnings: &mut warnings,
                line: 1,
            };
            handle_create_trigger(&tokens, &mut ctx).unwrap();
        }
        assert_eq!(model.triggers.len(), 2);
    }
}
