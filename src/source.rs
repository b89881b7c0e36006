//! Directory/file loading for DDL sources.
//!
//! Reads `.sql` files from disk and feeds them through [`crate::parser`],
//! merging every file's contribution into one accumulated [`SchemaModel`].
//! Grounded in the teacher's `input::sql::SqlLoader`: `.sql` files are
//! collected non-recursively from a directory, sorted lexicographically by
//! filename, and loaded in that order so the merge is deterministic
//! regardless of the filesystem's own iteration order.
//!
//! This is ambient I/O plumbing, not a parsing concern — [`crate::parser`]
//! never touches the filesystem, and this module never inspects a token.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ParserConfig;
use crate::model::SchemaModel;
use crate::parser::error::{ParseError, ParseWarning};
use crate::parser::parse_file;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path does not exist: {path}")]
    NotFound { path: PathBuf },
}

/// The result of loading one or more `.sql` sources: a single merged model
/// plus every error and warning collected across all files, in load order.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub model: SchemaModel,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
    /// Files loaded, in the order they were merged.
    pub files: Vec<PathBuf>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Loads `.sql` DDL from a directory or a single file, merging everything
/// into one [`SchemaModel`].
///
/// A `cancel` callback, checked once per file, lets a caller abort a large
/// multi-file load between files without the loader needing to know
/// anything about threads, signals, or async runtimes — matching the
/// library's synchronous, no-shared-state concurrency model.
pub struct DdlLoader<'a> {
    config: &'a ParserConfig,
}

impl<'a> DdlLoader<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Loads every `.sql` file directly inside `dir` (non-recursive),
    /// sorted lexicographically by filename, merging each into one model.
    pub fn load_directory(&self, dir: &Path) -> Result<LoadOutcome, LoadError> {
        self.load_directory_cancellable(dir, None)
    }

    pub fn load_directory_cancellable(
        &self,
        dir: &Path,
        cancel: Option<&dyn Fn() -> bool>,
    ) -> Result<LoadOutcome, LoadError> {
        let files = collect_sql_files(dir)?;
        let mut outcome = LoadOutcome::default();

        for file in &files {
            if cancel.map(|c| c()).unwrap_or(false) {
                tracing::info!(remaining = files.len() - outcome.files.len(), "load cancelled");
                break;
            }
            self.load_one(file, &mut outcome)?;
        }

        outcome.model.sort_canonical();
        Ok(outcome)
    }

    /// Loads a single `.sql` file into a fresh [`LoadOutcome`].
    pub fn load_file(&self, path: &Path) -> Result<LoadOutcome, LoadError> {
        let mut outcome = LoadOutcome::default();
        self.load_one(path, &mut outcome)?;
        outcome.model.sort_canonical();
        Ok(outcome)
    }

    fn load_one(&self, path: &Path, outcome: &mut LoadOutcome) -> Result<(), LoadError> {
        tracing::debug!(file = %path.display(), "loading DDL source");
        let file_outcome = parse_file(path, self.config).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        merge_model(&mut outcome.model, file_outcome.model);
        outcome.errors.extend(file_outcome.errors);
        outcome.warnings.extend(file_outcome.warnings);
        outcome.files.push(path.to_path_buf());
        Ok(())
    }
}

/// Folds one file's freshly-parsed model into the running aggregate,
/// reusing the model's own upsert/ensure methods so a definition repeated
/// across files (a common pattern in hand-maintained schema dumps) collapses
/// to its last occurrence rather than producing a duplicate entry.
fn merge_model(aggregate: &mut SchemaModel, incoming: SchemaModel) {
    for ns in incoming.namespaces {
        aggregate.ensure_namespace(&ns.name);
    }
    for ext in incoming.extensions {
        aggregate.upsert_extension(ext);
    }
    for ty in incoming.custom_types {
        aggregate.upsert_custom_type(ty);
    }
    for seq in incoming.sequences {
        aggregate.upsert_sequence(seq);
    }
    for table in incoming.tables {
        aggregate.upsert_table(table);
    }
    for view in incoming.views {
        aggregate.upsert_view(view);
    }
    for mview in incoming.materialized_views {
        aggregate.upsert_materialized_view(mview);
    }
    for function in incoming.functions {
        aggregate.upsert_function(function);
    }
    for trigger in incoming.triggers {
        aggregate.upsert_trigger(trigger);
    }
    for ht in incoming.hypertables {
        aggregate.upsert_hypertable(ht);
    }
    for cagg in incoming.continuous_aggregates {
        aggregate.upsert_continuous_aggregate(cagg);
    }
    if aggregate.database_name.is_none() {
        aggregate.database_name = incoming.database_name;
    }
}

/// Collects `.sql` files directly inside `dir`, case-insensitively matched
/// on extension, sorted lexicographically by filename.
fn collect_sql_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.exists() {
        return Err(LoadError::NotFound { path: dir.to_path_buf() });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_sql_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_sql_file(path: &Path) -> bool {
    path.extension().map(|ext| ext.eq_ignore_ascii_case("sql")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_directory_in_lexicographic_order_and_merges() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("002_index.sql"), "CREATE INDEX idx_users_email ON users (email);").unwrap();
        fs::write(dir.path().join("001_table.sql"), "CREATE TABLE users (id INT PRIMARY KEY, email TEXT);").unwrap();
        fs::write(dir.path().join("README.md"), "not sql").unwrap();

        let cfg = ParserConfig::default();
        let loader = DdlLoader::new(&cfg);
        let outcome = loader.load_directory(dir.path()).expect("load");

        assert!(outcome.is_clean());
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.files[0].file_name().unwrap(), "001_table.sql");
        assert_eq!(outcome.model.tables.len(), 1);
        assert_eq!(outcome.model.tables[0].indexes.len(), 1);
    }

    #[test]
    fn repeated_definition_across_files_collapses_to_last() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("001_create.sql"), "CREATE TABLE t (id INT);").unwrap();
        fs::write(dir.path().join("002_recreate.sql"), "CREATE TABLE t (id INT, name TEXT);").unwrap();

        let cfg = ParserConfig::default();
        let loader = DdlLoader::new(&cfg);
        let outcome = loader.load_directory(dir.path()).expect("load");

        assert_eq!(outcome.model.tables.len(), 1);
        assert_eq!(outcome.model.tables[0].columns.len(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let cfg = ParserConfig::default();
        let loader = DdlLoader::new(&cfg);
        let result = loader.load_directory(Path::new("/nonexistent/path/to/schema"));
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn load_file_reads_a_single_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("schema.sql");
        fs::write(&path, "CREATE TABLE widgets (id INT PRIMARY KEY);").unwrap();

        let cfg = ParserConfig::default();
        let loader = DdlLoader::new(&cfg);
        let outcome = loader.load_file(&path).expect("load");
        assert_eq!(outcome.model.tables.len(), 1);
        assert_eq!(outcome.files, vec![path]);
    }

    #[test]
    fn cancel_callback_stops_before_remaining_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("001_a.sql"), "CREATE TABLE a (id INT);").unwrap();
        fs::write(dir.path().join("002_b.sql"), "CREATE TABLE b (id INT);").unwrap();

        let cfg = ParserConfig::default();
        let loader = DdlLoader::new(&cfg);
        let cancel_now = || true;
        let outcome = loader
            .load_directory_cancellable(dir.path(), Some(&cancel_now))
            .expect("load");
        assert!(outcome.model.tables.is_empty());
    }
}
