//! Integration tests for the full load-then-diff pipeline: a directory of
//! `.sql` files on one side, a JSON `SchemaModel` snapshot on the other,
//! the same two input shapes the CLI binary wires together.

use pg_schema_differ::config::{Config, ParserConfig};
use pg_schema_differ::source::DdlLoader;
use pg_schema_differ::{diff, diff_with_config, ChangeKind, Severity};

fn write_sql_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("write fixture file");
    }
    dir
}

#[test]
fn loads_multi_file_directory_and_diffs_against_a_json_snapshot() {
    let dir = write_sql_dir(&[
        (
            "001_tables.sql",
            "CREATE TABLE public.customers (id SERIAL PRIMARY KEY, name TEXT NOT NULL);",
        ),
        (
            "002_orders.sql",
            "CREATE TABLE public.orders (id SERIAL PRIMARY KEY, customer_id INT);\n\
             ALTER TABLE public.orders ADD CONSTRAINT orders_customer_id_fkey \
             FOREIGN KEY (customer_id) REFERENCES public.customers(id);",
        ),
    ]);

    let cfg = ParserConfig::default();
    let loader = DdlLoader::new(&cfg);
    let outcome = loader.load_directory(dir.path()).expect("load directory");
    assert!(outcome.is_clean(), "unexpected parse errors: {:?}", outcome.errors);
    assert_eq!(outcome.model.tables.len(), 2);

    let current = pg_schema_differ::SchemaModel::new();
    let json = serde_json::to_string(&current).expect("serialize empty snapshot");
    let roundtripped: pg_schema_differ::SchemaModel = serde_json::from_str(&json).expect("deserialize snapshot");

    let changes = diff(&roundtripped, &outcome.model);
    assert!(changes.changes.iter().any(|c| c.kind == ChangeKind::AddTable));
    assert!(changes.changes.iter().any(|c| c.kind == ChangeKind::AddConstraint));
}

#[test]
fn cross_file_forward_reference_resolves_through_the_loader() {
    let dir = write_sql_dir(&[
        (
            "001_child.sql",
            "CREATE TABLE public.events_jan PARTITION OF public.events FOR VALUES FROM ('2026-01-01') TO ('2026-02-01');",
        ),
        (
            "002_parent.sql",
            "CREATE TABLE public.events (id INT, created_at DATE) PARTITION BY RANGE (created_at);",
        ),
    ]);

    let cfg = ParserConfig::default();
    let loader = DdlLoader::new(&cfg);
    let outcome = loader.load_directory(dir.path()).expect("load directory");
    assert!(outcome.is_clean(), "unexpected parse errors: {:?}", outcome.errors);

    let child = outcome
        .model
        .find_table(&pg_schema_differ::model::QualifiedName::new("public", "events_jan"))
        .expect("child partition present");
    assert!(child.partition_of.is_some(), "forward reference across files should resolve");
}

#[test]
fn diff_with_config_respects_treat_serial_sequence_as_owned() {
    let dir = write_sql_dir(&[("001.sql", "CREATE TABLE t (id SERIAL PRIMARY KEY);")]);
    let cfg = ParserConfig::default();
    let loader = DdlLoader::new(&cfg);
    let desired = loader.load_directory(dir.path()).expect("load directory").model;
    let current = pg_schema_differ::SchemaModel::new();

    let mut differ_cfg = Config::default().differ;
    differ_cfg.treat_serial_sequence_as_owned = false;
    let changes = diff_with_config(&current, &desired, &differ_cfg);
    assert!(changes.changes.iter().any(|c| c.kind == ChangeKind::AddSequence));

    let default_changes = diff(&current, &desired);
    assert!(!default_changes.changes.iter().any(|c| c.kind == ChangeKind::AddSequence));
}

#[test]
fn missing_directory_surfaces_as_a_load_error() {
    let cfg = ParserConfig::default();
    let loader = DdlLoader::new(&cfg);
    let result = loader.load_directory(std::path::Path::new("/no/such/schema/dir"));
    assert!(result.is_err());
}

#[test]
fn breaking_changes_are_detected_end_to_end() {
    let dir = write_sql_dir(&[("001.sql", "CREATE TABLE t (id INT PRIMARY KEY);")]);
    let cfg = ParserConfig::default();
    let loader = DdlLoader::new(&cfg);
    let desired = loader.load_directory(dir.path()).expect("load directory").model;
    let current = pg_schema_differ::SchemaModel::new();

    let changes = diff(&current, &desired);
    assert!(!changes.has_breaking_changes());

    let changes_reverse = diff(&desired, &current);
    assert!(changes_reverse.has_breaking_changes());
    assert_eq!(changes_reverse.count_by_severity().get(&Severity::Breaking), Some(&1));
}
