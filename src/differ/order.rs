//! Dependency ordering for a raw (unordered) change list.
//!
//! The diff pass in [`super`] emits changes per object kind without regard
//! to inter-object dependency; this module imposes the order a generated
//! migration script would need: schemas/extensions/types first, dependent
//! objects dropped before their parents, parents created before children,
//! and new tables topologically sorted over their foreign-key edges.

use std::collections::{HashMap, HashSet};

use crate::model::{ConstraintKind, QualifiedName, SchemaModel};

use super::{Change, ChangeKind};

/// Lower sorts earlier. Gaps are left between groups so a future kind can be
/// slotted in without renumbering everything.
fn phase(kind: ChangeKind) -> u8 {
    match kind {
        ChangeKind::AddSchema | ChangeKind::AddExtension | ChangeKind::AddType => 0,

        ChangeKind::DropTrigger => 10,
        ChangeKind::DropIndex => 11,
        ChangeKind::DropConstraint => 12,
        ChangeKind::ModifyIndex => 13,
        ChangeKind::ModifyConstraintDefinition => 14,
        ChangeKind::DropCagg => 15,
        ChangeKind::DropMview => 16,
        ChangeKind::DropView => 17,
        ChangeKind::DropHypertable => 18,
        ChangeKind::DropTable => 19,
        ChangeKind::DropSequence => 20,
        ChangeKind::DropFunction => 21,

        ChangeKind::AddTable => 30,
        ChangeKind::ModifyColumnType
        | ChangeKind::ModifyColumnDefault
        | ChangeKind::ModifyColumnNullable
        | ChangeKind::ModifyTableComment => 31,
        ChangeKind::AddSequence => 32,
        ChangeKind::AddIndex => 33,
        ChangeKind::AddConstraint => 34,
        ChangeKind::AddView => 35,
        ChangeKind::AddMview => 36,
        ChangeKind::ModifyViewDefinition => 37,
        ChangeKind::AddFunction => 38,
        ChangeKind::ModifyFunctionBody => 39,
        ChangeKind::AddTrigger => 40,
        ChangeKind::AddHypertable => 41,
        ChangeKind::ModifyCompressionSettings => 42,
        ChangeKind::ModifyRetentionPolicy => 43,
        ChangeKind::AddCagg => 44,
        ChangeKind::ModifyRefreshPolicy => 45,

        ChangeKind::DropType => 50,
        ChangeKind::DropExtension => 51,
        ChangeKind::DropSchema => 52,
    }
}

/// Stable-sorts `changes` by dependency phase and, within a phase, by
/// qualified object name; then refines the `AddTable` sub-sequence with a
/// foreign-key topological sort. Returns the ordered list plus any warnings
/// raised while breaking a dependency cycle.
pub fn order_changes(mut changes: Vec<Change>, current: &SchemaModel, desired: &SchemaModel) -> (Vec<Change>, Vec<String>) {
    changes.sort_by(|a, b| phase(a.kind).cmp(&phase(b.kind)).then_with(|| a.object.cmp(&b.object)));

    let mut warnings = Vec::new();
    reorder_new_tables(&mut changes, current, desired, &mut warnings);

    (changes, warnings)
}

/// Topologically sorts the contiguous run of `AddTable` changes by the
/// foreign-key edges among the tables being added, so a table with a FK to
/// another new table is created after it. A cycle (legal with deferred
/// constraints) is broken at an arbitrary edge and recorded as a warning.
fn reorder_new_tables(changes: &mut Vec<Change>, current: &SchemaModel, desired: &SchemaModel, warnings: &mut Vec<String>) {
    let added_names: HashSet<String> = changes
        .iter()
        .filter(|c| c.kind == ChangeKind::AddTable)
        .map(|c| c.object.clone())
        .collect();

    if added_names.len() < 2 {
        return;
    }

    let qualified_of = |q: &QualifiedName| format!("{}.{}", q.schema, q.name);

    // edge[a] = tables `a` must be created after (i.e. `a` references them).
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for table in &desired.tables {
        let qualified = qualified_of(&table.name);
        if !added_names.contains(&qualified) {
            continue;
        }
        for constraint in &table.constraints {
            if constraint.kind != ConstraintKind::ForeignKey {
                continue;
            }
            let Some(referenced) = &constraint.referenced_table else { continue };
            let referenced_qualified = qualified_of(referenced);
            if referenced_qualified != qualified && added_names.contains(&referenced_qualified) {
                edges.entry(qualified.clone()).or_default().push(referenced_qualified);
            }
        }
    }

    if edges.is_empty() {
        return;
    }

    let sorted = topo_sort(&added_names, &edges, warnings);

    let position: HashMap<&str, usize> = sorted.iter().enumerate().map(|(i, name)| (name.as_str(), i)).collect();
    let mut add_table_indices: Vec<usize> = changes
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind == ChangeKind::AddTable)
        .map(|(i, _)| i)
        .collect();
    add_table_indices.sort_by_key(|&i| position.get(changes[i].object.as_str()).copied().unwrap_or(usize::MAX));

    let reordered: Vec<Change> = add_table_indices.iter().map(|&i| changes[i].clone()).collect();
    for (slot, change) in add_table_indices.iter().zip(reordered) {
        changes[*slot] = change;
    }

    let _ = current; // kept for a symmetric signature; current-side ordering needs no FK graph today.
}

/// Kahn's algorithm over `edges[a] = [things a depends on]`. Ties broken by
/// name for determinism. Remaining nodes once no more in-degree-zero nodes
/// exist form a cycle; it's broken by dropping one edge (the lexicographically
/// first dependency of the lexicographically first cyclic node) and a warning
/// is emitted naming the two tables involved.
fn topo_sort(nodes: &HashSet<String>, edges: &HashMap<String, Vec<String>>, warnings: &mut Vec<String>) -> Vec<String> {
    let mut remaining: HashSet<String> = nodes.clone();
    let mut local_edges: HashMap<String, Vec<String>> = edges.clone();
    let mut result = Vec::new();

    loop {
        if remaining.is_empty() {
            break;
        }

        let mut ready: Vec<String> = remaining
            .iter()
            .filter(|n| local_edges.get(*n).map(|deps| deps.iter().all(|d| !remaining.contains(d))).unwrap_or(true))
            .cloned()
            .collect();
        ready.sort();

        if ready.is_empty() {
            // Every remaining node still has an unresolved dependency: a cycle.
            // Break it by dropping the first dependency of the
            // lexicographically smallest remaining node.
            let mut sorted_remaining: Vec<&String> = remaining.iter().collect();
            sorted_remaining.sort();
            let victim = sorted_remaining[0].clone();
            if let Some(deps) = local_edges.get_mut(&victim) {
                if !deps.is_empty() {
                    deps.sort();
                    let broken = deps.remove(0);
                    warnings.push(format!(
                        "foreign-key cycle detected between {victim} and {broken}; creation order broken arbitrarily"
                    ));
                }
            }
            continue;
        }

        for node in ready {
            remaining.remove(&node);
            result.push(node);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::Severity;
    use crate::model::SchemaModel;

    fn add_table(name: &str) -> Change {
        Change {
            kind: ChangeKind::AddTable,
            severity: Severity::Safe,
            object: name.to_string(),
            description: format!("add table {name}"),
        }
    }

    #[test]
    fn phase_orders_schema_before_table_before_trigger() {
        let changes = vec![
            Change { kind: ChangeKind::AddTrigger, severity: Severity::Safe, object: "public.t_trg".into(), description: String::new() },
            add_table("public.t"),
            Change { kind: ChangeKind::AddSchema, severity: Severity::Safe, object: "app".into(), description: String::new() },
        ];
        let current = SchemaModel::new();
        let desired = SchemaModel::new();
        let (ordered, warnings) = order_changes(changes, &current, &desired);
        assert!(warnings.is_empty());
        assert_eq!(ordered[0].kind, ChangeKind::AddSchema);
        assert_eq!(ordered[1].kind, ChangeKind::AddTable);
        assert_eq!(ordered[2].kind, ChangeKind::AddTrigger);
    }

    #[test]
    fn drops_precede_adds() {
        let changes = vec![
            add_table("public.new_t"),
            Change { kind: ChangeKind::DropTable, severity: Severity::Breaking, object: "public.old_t".into(), description: String::new() },
        ];
        let current = SchemaModel::new();
        let desired = SchemaModel::new();
        let (ordered, _) = order_changes(changes, &current, &desired);
        assert_eq!(ordered[0].kind, ChangeKind::DropTable);
        assert_eq!(ordered[1].kind, ChangeKind::AddTable);
    }

    #[test]
    fn new_tables_with_fk_are_topologically_sorted() {
        use crate::config::ParserConfig;
        use crate::parser::parse_sql;

        let desired = parse_sql(
            "CREATE TABLE public.orders (id INT PRIMARY KEY, customer_id INT REFERENCES public.customers(id));\n\
             CREATE TABLE public.customers (id INT PRIMARY KEY);",
            &ParserConfig::default(),
        )
        .model;
        let current = SchemaModel::new();

        let changes = vec![add_table("public.orders"), add_table("public.customers")];
        let (ordered, warnings) = order_changes(changes, &current, &desired);
        assert!(warnings.is_empty());
        let positions: Vec<&str> = ordered.iter().map(|c| c.object.as_str()).collect();
        let customers_pos = positions.iter().position(|p| *p == "public.customers").unwrap();
        let orders_pos = positions.iter().position(|p| *p == "public.orders").unwrap();
        assert!(customers_pos < orders_pos);
    }
}
