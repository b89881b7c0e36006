//! pg-schema-differ CLI
//!
//! A thin binary wiring the library together end to end: load a "current"
//! schema snapshot (a JSON `SchemaModel`) and a "desired" schema (a
//! directory of `.sql` DDL files), diff them, and print the resulting
//! `ChangeSet`. This is a demo harness, not the packaging-layer CLI a real
//! deployment would build on top (no SARIF/exit-code matrix, no migration
//! file generation) — see SPEC_FULL.md §1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pg_schema_differ::config::Config;
use pg_schema_differ::model::SchemaModel;
use pg_schema_differ::source::DdlLoader;

#[derive(Parser, Debug)]
#[command(name = "pg-schema-differ")]
#[command(about = "DDL parser and schema differ for PostgreSQL/TimescaleDB", long_about = None)]
struct Args {
    /// Path to a JSON file holding the current schema snapshot.
    #[arg(long)]
    current: PathBuf,

    /// Path to a directory of `.sql` files describing the desired schema.
    #[arg(long)]
    desired: PathBuf,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full change set as JSON instead of the text summary.
    #[arg(long)]
    json: bool,

    /// Exit with a nonzero status if any BREAKING change is found.
    #[arg(long)]
    fail_on_breaking: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).context("failed to load configuration")?,
        None => Config::default(),
    };

    let current = load_current(&args.current).context("failed to load current schema snapshot")?;

    let loader = DdlLoader::new(&config.parser);
    let desired_outcome = loader
        .load_directory(&args.desired)
        .with_context(|| format!("failed to load desired schema from {}", args.desired.display()))?;

    for warning in &desired_outcome.warnings {
        tracing::warn!(%warning, "parse warning");
    }
    for error in &desired_outcome.errors {
        tracing::error!(%error, "parse error");
    }

    let change_set = pg_schema_differ::diff_with_config(&current, &desired_outcome.model, &config.differ);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&change_set)?);
    } else {
        println!("{}", change_set.summary());
    }

    if args.fail_on_breaking && change_set.has_breaking_changes() {
        std::process::exit(1);
    }
    Ok(())
}

fn load_current(path: &std::path::Path) -> Result<SchemaModel> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let model: SchemaModel = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} as a SchemaModel", path.display()))?;
    Ok(model)
}
