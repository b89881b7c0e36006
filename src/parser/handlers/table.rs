//! `CREATE TABLE` and `ALTER TABLE` handlers.

use crate::lexer::{Token, TokenKind};
use crate::model::{
    generate_constraint_name, Column, Constraint, ConstraintKind, GeneratedKind, Index,
    IdentityMetadata, PartitionBound, PartitionKind, PartitionStrategy, QualifiedName,
    ReferentialAction, Sequence, Table,
};
use crate::normalize::split_qualified_name;
use crate::parser::context::HandlerCtx;
use crate::parser::error::{ParseError, ParseWarning};
use crate::parser::scan::{
    collect_literal_until, find_matching_close, find_next_lparen, is_kw, match_keywords,
    skip_comments, split_by_comma, tokens_to_text,
};

/// `CREATE TABLE [schema.]name ( ... ) [PARTITION BY kind (cols)] |
///  CREATE TABLE [schema.]name PARTITION OF parent FOR VALUES ...`
pub fn handle_create_table(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["CREATE", "TABLE"]).ok_or_else(|| missing(ctx, "name"))?;
    i = skip_comments(tokens, i);
    if match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]).is_some() {
        i = match_keywords(tokens, i, &["IF", "NOT", "EXISTS"]).unwrap();
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;
    i = skip_comments(tokens, i);

    if is_kw(tokens, i, "PARTITION") {
        return handle_partition_of(tokens, i, name, ctx);
    }

    let open = find_next_lparen(tokens, i).ok_or_else(|| missing(ctx, "column list"))?;
    let close = find_matching_close(tokens, open).ok_or_else(|| missing(ctx, "column list"))?;
    let body = &tokens[open + 1..close];

    let mut table = Table::new(name.clone());
    let mut synthesized_constraints = Vec::new();

    for part in split_by_comma(body) {
        if is_table_constraint_start(part) {
            synthesized_constraints.push(parse_table_constraint(part, &name, ctx));
        } else {
            let (column, inline_constraints, sequence) = parse_column_def(part, &name, ctx);
            table.columns.push(column);
            synthesized_constraints.extend(inline_constraints);
            if let Some(seq) = sequence {
                // Implicit SERIAL sequences are never pushed into the
                // top-level model list — they exist only as the column's
                // default expression. See Sequence::implicit.
                debug_assert!(seq.implicit);
            }
        }
    }

    for (idx, col) in table.columns.iter_mut().enumerate() {
        col.ordinal = (idx + 1) as i32;
    }

    for constraint in synthesized_constraints {
        reify_unique_index(&mut table, &constraint);
        table.constraints.push(constraint);
    }

    let mut rest = close + 1;
    rest = skip_comments(tokens, rest);
    if is_kw(tokens, rest, "PARTITION") {
        rest = match_keywords(tokens, rest, &["PARTITION", "BY"]).unwrap_or(rest);
        let kind = match tokens.get(rest) {
            Some(t) if t.is_keyword("HASH") => PartitionKind::Hash,
            Some(t) if t.is_keyword("RANGE") => PartitionKind::Range,
            Some(t) if t.is_keyword("LIST") => PartitionKind::List,
            _ => PartitionKind::Range,
        };
        rest += 1;
        if let Some(col_open) = find_next_lparen(tokens, rest) {
            if let Some(col_close) = find_matching_close(tokens, col_open) {
                let cols = split_by_comma(&tokens[col_open + 1..col_close])
                    .into_iter()
                    .map(tokens_to_text)
                    .collect();
                table.partition_strategy = Some(PartitionStrategy { kind, columns: cols });
            }
        }
    }

    ctx.model.upsert_table(table);
    Ok(())
}

fn handle_partition_of(
    tokens: &[Token],
    mut i: usize,
    child_name: QualifiedName,
    ctx: &mut HandlerCtx,
) -> Result<(), ParseError> {
    i = match_keywords(tokens, i, &["PARTITION", "OF"]).ok_or_else(|| missing(ctx, "PARTITION OF parent"))?;
    let parent_tok = tokens.get(i).ok_or_else(|| missing(ctx, "parent table name"))?;
    let parent_name = split_qualified_name(parent_tok.text, &ctx.default_schema());
    i += 1;

    let for_values_start = i;
    let definition = tokens_to_text(&tokens[for_values_start..]);

    let mut table = Table::new(child_name.clone());
    if let Some(parent) = ctx.model.find_table(&parent_name) {
        table.partition_of = Some(PartitionBound {
            parent: parent.name.clone(),
            definition: definition.clone(),
        });
        ctx.model.upsert_table(table);
    } else {
        ctx.model.upsert_table(table);
        ctx.pending.queue_partition(child_name, parent_name, definition);
    }
    Ok(())
}

fn is_table_constraint_start(part: &[Token]) -> bool {
    part.first()
        .map(|t| {
            t.is_keyword("CONSTRAINT")
                || t.is_keyword("PRIMARY")
                || t.is_keyword("FOREIGN")
                || t.is_keyword("UNIQUE")
                || t.is_keyword("CHECK")
                || t.is_keyword("EXCLUDE")
        })
        .unwrap_or(false)
}

fn parse_table_constraint(part: &[Token], table: &QualifiedName, ctx: &mut HandlerCtx) -> Constraint {
    let mut i = 0;
    let mut explicit_name = None;
    if part.first().map(|t| t.is_keyword("CONSTRAINT")).unwrap_or(false) {
        if let Some(name_tok) = part.get(1) {
            explicit_name = Some(crate::normalize::normalize_identifier(name_tok.text));
        }
        i = 2;
    }

    let kind_tok = part.get(i);
    let (kind, mut body_start) = match kind_tok {
        Some(t) if t.is_keyword("PRIMARY") => (ConstraintKind::PrimaryKey, i + 2), // PRIMARY KEY
        Some(t) if t.is_keyword("FOREIGN") => (ConstraintKind::ForeignKey, i + 2), // FOREIGN KEY
        Some(t) if t.is_keyword("UNIQUE") => (ConstraintKind::Unique, i + 1),
        Some(t) if t.is_keyword("CHECK") => (ConstraintKind::Check, i + 1),
        Some(t) if t.is_keyword("EXCLUDE") => (ConstraintKind::Exclude, i + 1),
        _ => (ConstraintKind::Check, i),
    };
    body_start = skip_comments(part, body_start);

    let definition = tokens_to_text(part);

    match kind {
        ConstraintKind::PrimaryKey | ConstraintKind::Unique | ConstraintKind::Exclude => {
            let cols = columns_in_parens(part, body_start);
            let name = explicit_name.unwrap_or_else(|| generate_constraint_name(&table.name, &cols, kind));
            Constraint {
                name,
                kind,
                columns: cols,
                definition,
                referenced_table: None,
                referenced_columns: Vec::new(),
                on_delete: None,
                on_update: None,
                deferrable: false,
                initially_deferred: false,
                check_expression: None,
            }
        }
        ConstraintKind::ForeignKey => {
            let cols = columns_in_parens(part, body_start);
            let ref_idx = body_start
                + part[body_start..]
                    .iter()
                    .position(|t| t.kind == TokenKind::RParen)
                    .map(|p| p + 1)
                    .unwrap_or(0);
            let (referenced_table, referenced_columns, on_delete, on_update) =
                parse_references_clause(part, ref_idx, table, ctx);
            let name = explicit_name.unwrap_or_else(|| generate_constraint_name(&table.name, &cols, kind));
            Constraint {
                name,
                kind,
                columns: cols,
                definition,
                referenced_table: Some(referenced_table),
                referenced_columns,
                on_delete,
                on_update,
                deferrable: false,
                initially_deferred: false,
                check_expression: None,
            }
        }
        ConstraintKind::Check => {
            let expr = part
                .get(body_start)
                .filter(|t| t.kind == TokenKind::LParen)
                .and_then(|_| find_matching_close(part, body_start))
                .map(|close| tokens_to_text(&part[body_start + 1..close]));
            let name = explicit_name
                .unwrap_or_else(|| generate_constraint_name(&table.name, &[], ConstraintKind::Check));
            Constraint {
                name,
                kind: ConstraintKind::Check,
                columns: Vec::new(),
                definition,
                referenced_table: None,
                referenced_columns: Vec::new(),
                on_delete: None,
                on_update: None,
                deferrable: false,
                initially_deferred: false,
                check_expression: expr,
            }
        }
    }
}

fn columns_in_parens(tokens: &[Token], open_pos: usize) -> Vec<String> {
    if tokens.get(open_pos).map(|t| t.kind) != Some(TokenKind::LParen) {
        return Vec::new();
    }
    match find_matching_close(tokens, open_pos) {
        Some(close) => split_by_comma(&tokens[open_pos + 1..close])
            .into_iter()
            .map(|t| tokens_to_text(t))
            .collect(),
        None => Vec::new(),
    }
}

fn parse_references_clause(
    tokens: &[Token],
    mut i: usize,
    current_table: &QualifiedName,
    ctx: &mut HandlerCtx,
) -> (QualifiedName, Vec<String>, Option<ReferentialAction>, Option<ReferentialAction>) {
    i = skip_comments(tokens, i);
    if is_kw(tokens, i, "REFERENCES") {
        i += 1;
    }
    i = skip_comments(tokens, i);
    let target = tokens
        .get(i)
        .map(|t| split_qualified_name(t.text, &current_table.schema))
        .unwrap_or_else(|| {
            ctx.warn("foreign key missing REFERENCES target");
            current_table.clone()
        });
    i += 1;
    i = skip_comments(tokens, i);

    let mut cols = Vec::new();
    if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LParen) {
        if let Some(close) = find_matching_close(tokens, i) {
            cols = split_by_comma(&tokens[i + 1..close]).into_iter().map(tokens_to_text).collect();
            i = close + 1;
        }
    }

    let mut on_delete = None;
    let mut on_update = None;
    loop {
        i = skip_comments(tokens, i);
        if let Some(idx) = match_keywords(tokens, i, &["ON", "DELETE"]) {
            let (action, next) = parse_referential_action(tokens, idx);
            on_delete = Some(action);
            i = next;
        } else if let Some(idx) = match_keywords(tokens, i, &["ON", "UPDATE"]) {
            let (action, next) = parse_referential_action(tokens, idx);
            on_update = Some(action);
            i = next;
        } else {
            break;
        }
    }

    (target, cols, on_delete, on_update)
}

fn parse_referential_action(tokens: &[Token], i: usize) -> (ReferentialAction, usize) {
    if let Some(idx) = match_keywords(tokens, i, &["CASCADE"]) {
        return (ReferentialAction::Cascade, idx);
    }
    if let Some(idx) = match_keywords(tokens, i, &["RESTRICT"]) {
        return (ReferentialAction::Restrict, idx);
    }
    if let Some(idx) = match_keywords(tokens, i, &["SET", "NULL"]) {
        return (ReferentialAction::SetNull, idx);
    }
    if let Some(idx) = match_keywords(tokens, i, &["SET", "DEFAULT"]) {
        return (ReferentialAction::SetDefault, idx);
    }
    if let Some(idx) = match_keywords(tokens, i, &["NO", "ACTION"]) {
        return (ReferentialAction::NoAction, idx);
    }
    (ReferentialAction::NoAction, i)
}

/// Parses one column definition, returning the column, any constraints
/// synthesized from inline clauses (PK/UNIQUE/REFERENCES/CHECK), and the
/// implicit sequence a SERIAL-family type produces (for documentation —
/// never inserted into the model directly).
fn parse_column_def(
    part: &[Token],
    table: &QualifiedName,
    ctx: &mut HandlerCtx,
) -> (Column, Vec<Constraint>, Option<Sequence>) {
    let name_tok = &part[0];
    let name = crate::normalize::normalize_identifier(name_tok.text);
    let (type_info, mut i) = crate::parser::types::parse_type(part, 1);

    let mut column = Column::new(name.clone(), type_info.base.clone(), 0);
    column.max_length = type_info.max_length;
    column.precision = type_info.precision;
    column.scale = type_info.scale;
    column.is_array = type_info.is_array;

    let mut constraints = Vec::new();
    let mut synthesized_sequence = None;
    let mut explicit_null_seen = false;

    if let Some(serial) = type_info.serial {
        column.data_type = serial.expanded_type().to_string();
        column.is_nullable = false;
        let default = format!("nextval('{}_{}_seq'::regclass)", table.name, name);
        column.default = Some(default);
        synthesized_sequence = Some(Sequence::default_for_serial(table, &name, serial.expanded_type()));
    }

    loop {
        i = skip_comments(part, i);
        let Some(tok) = part.get(i) else { break };
        if tok.is_keyword("NOT") && is_kw(part, i + 1, "NULL") {
            column.is_nullable = false;
            explicit_null_seen = true;
            i += 2;
        } else if tok.is_keyword("NULL") {
            if !explicit_null_seen && type_info.serial.is_none() {
                column.is_nullable = true;
            }
            i += 1;
        } else if tok.is_keyword("DEFAULT") {
            let (expr, next) = collect_literal_until(
                part,
                i + 1,
                &["NOT", "NULL", "PRIMARY", "UNIQUE", "REFERENCES", "CHECK", "GENERATED", "COLLATE"],
            );
            // Stored verbatim (collapsed whitespace only); the differ's
            // default-expression comparison applies keyword normalization,
            // not storage.
            column.default = Some(expr);
            i = next;
        } else if tok.is_keyword("PRIMARY") {
            column.is_nullable = false;
            let cname = generate_constraint_name(&table.name, &[name.clone()], ConstraintKind::PrimaryKey);
            constraints.push(Constraint {
                name: cname,
                kind: ConstraintKind::PrimaryKey,
                columns: vec![name.clone()],
                definition: format!("PRIMARY KEY ({name})"),
                referenced_table: None,
                referenced_columns: Vec::new(),
                on_delete: None,
                on_update: None,
                deferrable: false,
                initially_deferred: false,
                check_expression: None,
            });
            i += 2; // PRIMARY KEY
        } else if tok.is_keyword("UNIQUE") {
            let cname = generate_constraint_name(&table.name, &[name.clone()], ConstraintKind::Unique);
            constraints.push(Constraint {
                name: cname,
                kind: ConstraintKind::Unique,
                columns: vec![name.clone()],
                definition: format!("UNIQUE ({name})"),
                referenced_table: None,
                referenced_columns: Vec::new(),
                on_delete: None,
                on_update: None,
                deferrable: false,
                initially_deferred: false,
                check_expression: None,
            });
            i += 1;
        } else if tok.is_keyword("REFERENCES") {
            let (ref_table, ref_cols, on_delete, on_update) = parse_references_clause(part, i, table, ctx);
            let cname = generate_constraint_name(&table.name, &[name.clone()], ConstraintKind::ForeignKey);
            constraints.push(Constraint {
                name: cname,
                kind: ConstraintKind::ForeignKey,
                columns: vec![name.clone()],
                definition: format!("REFERENCES {ref_table}"),
                referenced_table: Some(ref_table),
                referenced_columns: ref_cols,
                on_delete,
                on_update,
                deferrable: false,
                initially_deferred: false,
                check_expression: None,
            });
            // parse_references_clause doesn't tell us how far it consumed;
            // reconstruct by scanning to the next stop-word at depth 0.
            let (_, next) = collect_literal_until(
                part,
                i + 1,
                &["NOT", "DEFAULT", "UNIQUE", "CHECK", "GENERATED", "COLLATE"],
            );
            i = next;
        } else if tok.is_keyword("CHECK") {
            let open = i + 1;
            if part.get(open).map(|t| t.kind) == Some(TokenKind::LParen) {
                if let Some(close) = find_matching_close(part, open) {
                    let expr = tokens_to_text(&part[open + 1..close]);
                    let cname = generate_constraint_name(&table.name, &[], ConstraintKind::Check);
                    constraints.push(Constraint {
                        name: cname,
                        kind: ConstraintKind::Check,
                        columns: vec![name.clone()],
                        definition: format!("CHECK ({expr})"),
                        referenced_table: None,
                        referenced_columns: Vec::new(),
                        on_delete: None,
                        on_update: None,
                        deferrable: false,
                        initially_deferred: false,
                        check_expression: Some(expr),
                    });
                    i = close + 1;
                    continue;
                }
            }
            i += 1;
        } else if tok.is_keyword("GENERATED") {
            let generated = if match_keywords(part, i, &["GENERATED", "ALWAYS"]).is_some() {
                GeneratedKind::Always
            } else {
                GeneratedKind::ByDefault
            };
            column.identity = Some(IdentityMetadata { generated });
            let (_, next) = collect_literal_until(part, i + 1, &["NOT", "DEFAULT", "PRIMARY", "UNIQUE", "CHECK"]);
            i = next;
        } else if tok.is_keyword("COLLATE") {
            i += 2;
        } else {
            i += 1;
        }
        if i >= part.len() {
            break;
        }
    }

    if column.identity.is_some() {
        column.is_nullable = false;
    }

    let _ = ctx.config; // config presently only affects identifier case, handled in normalize
    (column, constraints, synthesized_sequence)
}

fn reify_unique_index(table: &mut Table, constraint: &Constraint) {
    if matches!(constraint.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique) {
        table.indexes.push(Index {
            name: QualifiedName::new(table.name.schema.clone(), constraint.name.clone()),
            table: table.name.clone(),
            index_type: "btree".to_string(),
            is_unique: true,
            is_primary: constraint.kind == ConstraintKind::PrimaryKey,
            columns: constraint.columns.clone(),
            include_columns: Vec::new(),
            predicate: None,
            storage_params: None,
            tablespace: None,
            definition: format!(
                "CREATE UNIQUE INDEX {} ON {} ({})",
                constraint.name,
                table.name,
                constraint.columns.join(", ")
            ),
        });
    }
}

/// `ALTER TABLE ... ADD COLUMN | DROP COLUMN | ADD CONSTRAINT | ALTER COLUMN
/// ... SET|DROP DEFAULT | ALTER COLUMN ... SET|DROP NOT NULL | ALTER COLUMN
/// ... TYPE ...`
pub fn handle_alter_table(tokens: &[Token], ctx: &mut HandlerCtx) -> Result<(), ParseError> {
    let mut i = match_keywords(tokens, 0, &["ALTER", "TABLE"]).ok_or_else(|| missing(ctx, "table name"))?;
    i = skip_comments(tokens, i);
    if let Some(idx) = match_keywords(tokens, i, &["IF", "EXISTS"]) {
        i = idx;
    }
    let name_tok = tokens.get(i).ok_or_else(|| missing(ctx, "table name"))?;
    let name = split_qualified_name(name_tok.text, &ctx.default_schema());
    i += 1;

    let Some(table) = ctx.model.find_table_mut(&name) else {
        ctx.warn(format!("ALTER TABLE references unknown table {name}"));
        return Ok(());
    };

    for action in split_by_comma(&tokens[i..tokens.len().saturating_sub(1)]) {
        apply_alter_action(action, table);
    }
    Ok(())
}

fn apply_alter_action(action: &[Token], table: &mut Table) {
    let i = skip_comments(action, 0);
    if match_keywords(action, i, &["ADD", "COLUMN"]).is_some() || is_kw(action, i, "ADD") {
        let start = match_keywords(action, i, &["ADD", "COLUMN"]).unwrap_or(i + 1);

        let mut dummy_warnings = Vec::new();
        let mut dummy_pending = crate::parser::pending::PendingAttachments::new();
        let cfg = crate::config::ParserConfig::default();
        let mut model = crate::model::SchemaModel::new();
        let mut ctx = HandlerCtx {
            config: &cfg,
            model: &mut model,
            pending: &mut dummy_pending,
            warnings: &mut dummy_warnings,
            line: 0,
        };

        if is_table_constraint_start(&action[start.min(action.len())..]) {
            let constraint = parse_table_constraint(&action[start..], &table.name, &mut ctx);
            reify_unique_index(table, &constraint);
            table.constraints.push(constraint);
            return;
        }

        let (mut column, constraints, _) = parse_column_def(&action[start..], &table.name, &mut ctx);
        column.ordinal = table.columns.len() as i32 + 1;
        table.columns.push(column);
        for c in constraints {
            reify_unique_index(table, &c);
            table.constraints.push(c);
        }
    } else if is_kw(action, i, "DROP") {
        let start = if is_kw(action, i + 1, "COLUMN") { i + 2 } else { i + 1 };
        if let Some(tok) = action.get(start) {
            let col_name = crate::normalize::normalize_identifier(tok.text);
            table.columns.retain(|c| c.name != col_name);
        }
    }
}

fn missing(ctx: &HandlerCtx, clause: &str) -> ParseError {
    ParseError::MissingClause {
        file: None,
        line: ctx.line,
        statement_kind: "CREATE TABLE".to_string(),
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

    fn parse_one(sql: &str) -> (SchemaModel, Vec<ParseWarning>) {
        let tokens = Lexer::tokenize(sql).unwrap();
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        {
            let mut ctx = HandlerCtx {
                config: &cfg,
                model: &mut model,
                pending: &mut pending,
                warnings: &mut warnings,
                line: 1,
            };
            handle_create_table(&tokens, &mut ctx).unwrap();
        }
        (model, warnings)
    }

    #[test]
    fn simple_table_with_pk() {
        let (model, _) = parse_one("CREATE TABLE app.users(id UUID PRIMARY KEY, email TEXT NOT NULL UNIQUE)");
        let table = &model.tables[0];
        assert_eq!(table.name, QualifiedName::new("app", "users"));
        assert_eq!(table.columns.len(), 2);
        assert!(table.constraints.iter().any(|c| c.kind == ConstraintKind::PrimaryKey));
        assert!(table.constraints.iter().any(|c| c.kind == ConstraintKind::Unique));
        // PK and UNIQUE both reify to unique indexes.
        assert_eq!(table.indexes.len(), 2);
    }

    #[test]
    fn bigserial_expansion() {
        let (model, _) = parse_one("CREATE TABLE x(id BIGSERIAL PRIMARY KEY)");
        let col = &model.tables[0].columns[0];
        assert_eq!(col.data_type, "BIGINT");
        assert!(!col.is_nullable);
        assert!(col.default.as_ref().unwrap().starts_with("nextval('x_id_seq"));
    }

    #[test]
    fn foreign_key_inline() {
        let (model, _) =
            parse_one("CREATE TABLE orders(id INT PRIMARY KEY, user_id INT REFERENCES users(id) ON DELETE CASCADE)");
        let table = &model.tables[0];
        let fk = table.constraints.iter().find(|c| c.kind == ConstraintKind::ForeignKey).unwrap();
        assert_eq!(fk.referenced_table.as_ref().unwrap().name, "users");
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn numeric_column_precision() {
        let (model, _) = parse_one("CREATE TABLE t(amount NUMERIC(10,2))");
        let col = &model.tables[0].columns[0];
        assert_eq!(col.precision, Some(10));
        assert_eq!(col.scale, Some(2));
    }

    #[test]
    fn check_constraint_multiline_paren_balance() {
        let (model, _) = parse_one("CREATE TABLE t(status TEXT, CHECK (status IN ('a','b','c')))");
        let check = model.tables[0]
            .constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::Check)
            .unwrap();
        assert!(check.check_expression.as_ref().unwrap().contains("IN ("));
    }

    #[test]
    fn alter_table_add_constraint_is_reified() {
        let cfg = ParserConfig::default();
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        let mut warnings = Vec::new();
        {
            let tokens = Lexer::tokenize("CREATE TABLE orders(id INT, user_id INT)").unwrap();
            let mut ctx = HandlerCtx { config: &cfg, model: &mut model, pending: &mut pending, warnings: &mut warnings, line: 1 };
            handle_create_table(&tokens, &mut ctx).unwrap();
        }
        {
            let tokens = Lexer::tokenize(
                "ALTER TABLE orders ADD CONSTRAINT orders_user_id_fkey FOREIGN KEY (user_id) REFERENCES users(id)",
            )
            .unwrap();
            let mut ctx = HandlerCtx { config: &cfg, model: &mut model, pending: &mut pending, warnings: &mut warnings, line: 2 };
            handle_alter_table(&tokens, &mut ctx).unwrap();
        }
        let table = &model.tables[0];
        let fk = table.constraints.iter().find(|c| c.kind == ConstraintKind::ForeignKey).unwrap();
        assert_eq!(fk.name, "orders_user_id_fkey");
        assert_eq!(fk.referenced_table.as_ref().unwrap().name, "users");
    }

    #[test]
    fn hash_partition_parent() {
        let (model, _) = parse_one("CREATE TABLE items(id INT) PARTITION BY HASH (user_id)");
        let strat = model.tables[0].partition_strategy.as_ref().unwrap();
        assert_eq!(strat.kind, PartitionKind::Hash);
        assert_eq!(strat.columns, vec!["user_id".to_string()]);
    }
}
