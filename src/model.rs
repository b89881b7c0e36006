//! The `SchemaModel` data model: a normalized, declarative snapshot of a
//! single database's schema shape.
//!
//! This module defines only the shape of the data. Population (by the
//! parser) and comparison (by the differ) live in their own modules; both
//! funnel every identifier comparison through [`crate::normalize`] rather
//! than scattering `to_lowercase()` calls here.

use serde::{Deserialize, Serialize};

/// A schema-qualified name. Compared case-insensitively via
/// [`crate::normalize::identifiers_eq`]; stored lowercased except for the
/// exact characters inside a quoted identifier (callers needing
/// case-sensitive comparison opt in via `ParserConfig::case_sensitive`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Where a `SchemaModel` came from. Diagnostic only — never compared by the
/// differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    Parsed,
    Extracted,
}

impl Default for SchemaSource {
    fn default() -> Self {
        SchemaSource::Parsed
    }
}

/// The top-level container: a single database's declarative shape.
///
/// Constructed empty, populated incrementally (one statement at a time) by
/// the parser or deserialized whole from the extractor's JSON, then
/// normalized into canonical order via [`SchemaModel::sort_canonical`] —
/// after which it is treated as immutable by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub database_name: Option<String>,
    #[serde(skip)]
    pub source: SchemaSource,

    #[serde(rename = "schemas", default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Extension>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_types: Vec<CustomType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequences: Vec<Sequence>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,
    #[serde(rename = "materialized_views", default, skip_serializing_if = "Vec::is_empty")]
    pub materialized_views: Vec<MaterializedView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hypertables: Vec<Hypertable>,
    #[serde(rename = "continuous_aggregates", default, skip_serializing_if = "Vec::is_empty")]
    pub continuous_aggregates: Vec<ContinuousAggregate>,
}

impl Default for SchemaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaModel {
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            database_name: None,
            source: SchemaSource::Parsed,
            namespaces: Vec::new(),
            extensions: Vec::new(),
            custom_types: Vec::new(),
            sequences: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
            materialized_views: Vec::new(),
            functions: Vec::new(),
            triggers: Vec::new(),
            hypertables: Vec::new(),
            continuous_aggregates: Vec::new(),
        }
    }

    pub fn find_table(&self, name: &QualifiedName) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| crate::normalize::qualified_names_eq(&t.name, name))
    }

    pub fn find_table_mut(&mut self, name: &QualifiedName) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| crate::normalize::qualified_names_eq(&t.name, name))
    }

    /// Insert or overwrite a table keyed by (schema, name) — handler
    /// idempotence contract.
    pub fn upsert_table(&mut self, table: Table) {
        if let Some(existing) = self
            .tables
            .iter_mut()
            .find(|t| crate::normalize::qualified_names_eq(&t.name, &table.name))
        {
            *existing = table;
        } else {
            self.tables.push(table);
        }
    }

    pub fn upsert_view(&mut self, view: View) {
        if let Some(existing) = self
            .views
            .iter_mut()
            .find(|v| crate::normalize::qualified_names_eq(&v.name, &view.name))
        {
            *existing = view;
        } else {
            self.views.push(view);
        }
    }

    pub fn upsert_materialized_view(&mut self, mview: MaterializedView) {
        if let Some(existing) = self
            .materialized_views
            .iter_mut()
            .find(|v| crate::normalize::qualified_names_eq(&v.name, &mview.name))
        {
            *existing = mview;
        } else {
            self.materialized_views.push(mview);
        }
    }

    pub fn upsert_function(&mut self, function: Function) {
        if let Some(existing) = self.functions.iter_mut().find(|f| {
            crate::normalize::qualified_names_eq(&f.name, &function.name)
                && f.arguments.len() == function.arguments.len()
        }) {
            *existing = function;
        } else {
            self.functions.push(function);
        }
    }

    pub fn upsert_trigger(&mut self, trigger: Trigger) {
        if let Some(existing) = self.triggers.iter_mut().find(|t| {
            crate::normalize::qualified_names_eq(&t.table, &trigger.table)
                && crate::normalize::identifiers_eq(&t.name, &trigger.name)
        }) {
            *existing = trigger;
        } else {
            self.triggers.push(trigger);
        }
    }

    pub fn upsert_sequence(&mut self, sequence: Sequence) {
        if let Some(existing) = self
            .sequences
            .iter_mut()
            .find(|s| crate::normalize::qualified_names_eq(&s.name, &sequence.name))
        {
            *existing = sequence;
        } else {
            self.sequences.push(sequence);
        }
    }

    pub fn upsert_custom_type(&mut self, ty: CustomType) {
        if let Some(existing) = self
            .custom_types
            .iter_mut()
            .find(|t| crate::normalize::qualified_names_eq(&t.name, &ty.name))
        {
            *existing = ty;
        } else {
            self.custom_types.push(ty);
        }
    }

    pub fn upsert_extension(&mut self, ext: Extension) {
        if let Some(existing) = self
            .extensions
            .iter_mut()
            .find(|e| crate::normalize::identifiers_eq(&e.name, &ext.name))
        {
            *existing = ext;
        } else {
            self.extensions.push(ext);
        }
    }

    pub fn upsert_hypertable(&mut self, ht: Hypertable) {
        if let Some(existing) = self
            .hypertables
            .iter_mut()
            .find(|h| crate::normalize::qualified_names_eq(&h.table, &ht.table))
        {
            *existing = ht;
        } else {
            self.hypertables.push(ht);
        }
    }

    pub fn upsert_continuous_aggregate(&mut self, cagg: ContinuousAggregate) {
        if let Some(existing) = self
            .continuous_aggregates
            .iter_mut()
            .find(|c| crate::normalize::qualified_names_eq(&c.name, &cagg.name))
        {
            *existing = cagg;
        } else {
            self.continuous_aggregates.push(cagg);
        }
    }

    pub fn ensure_namespace(&mut self, name: &str) {
        if !self
            .namespaces
            .iter()
            .any(|n| crate::normalize::identifiers_eq(&n.name, name))
        {
            self.namespaces.push(Namespace {
                name: crate::normalize::normalize_identifier(name),
            });
        }
    }

    /// Sort every entity sequence into the canonical order described by the
    /// parser's ordering rules, making textual/JSON output deterministic
    /// regardless of statement order in the source.
    pub fn sort_canonical(&mut self) {
        self.namespaces.sort_by(|a, b| a.name.cmp(&b.name));
        self.extensions.sort_by(|a, b| a.name.cmp(&b.name));
        self.custom_types
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));
        self.sequences
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));

        for table in &mut self.tables {
            table.columns.sort_by_key(|c| c.ordinal);
            table
                .constraints
                .sort_by(|a, b| (a.kind as u8, &a.name).cmp(&(b.kind as u8, &b.name)));
            table.indexes.sort_by(|a, b| a.name.name.cmp(&b.name.name));
        }
        self.tables
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));

        self.views
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));

        for mview in &mut self.materialized_views {
            mview.indexes.sort_by(|a, b| a.name.name.cmp(&b.name.name));
        }
        self.materialized_views
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));

        self.functions.sort_by(|a, b| a.signature().cmp(&b.signature()));
        self.triggers.sort_by(|a, b| {
            (&a.table.schema, &a.table.name, &a.name).cmp(&(&b.table.schema, &b.table.name, &b.name))
        });
        self.hypertables
            .sort_by(|a, b| (&a.table.schema, &a.table.name).cmp(&(&b.table.schema, &b.table.name)));

        for cagg in &mut self.continuous_aggregates {
            cagg.indexes.sort_by(|a, b| a.name.name.cmp(&b.name.name));
        }
        self.continuous_aggregates
            .sort_by(|a, b| (&a.name.schema, &a.name.name).cmp(&(&b.name.schema, &b.name.name)));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomTypeKind {
    Enum,
    Composite,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomType {
    #[serde(flatten)]
    pub name: QualifiedName,
    #[serde(rename = "type")]
    pub kind: CustomTypeKind,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub data_type: String,
    pub start_value: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub increment: i64,
    pub cache_size: i64,
    pub is_cyclic: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owned_by_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owned_by_column: Option<String>,
    /// True for a sequence synthesized implicitly by a `SERIAL`-family
    /// column default. The parser never pushes an implicit sequence into
    /// `SchemaModel.sequences` at all (it only shows up on the column's
    /// default expression); this flag exists so `normalize_for_diff` can
    /// filter the *extracted* side's equivalent explicit `Sequence` entry to
    /// match, per the open question on SERIAL/sequence-ownership parity.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub implicit: bool,
}

impl Sequence {
    pub fn default_for_serial(table: &QualifiedName, column: &str, data_type: &str) -> Self {
        Self {
            name: QualifiedName::new(table.schema.clone(), format!("{}_{}_seq", table.name, column)),
            data_type: data_type.to_string(),
            start_value: 1,
            min_value: 1,
            max_value: match data_type {
                "SMALLINT" => 32767,
                "BIGINT" => i64::MAX,
                _ => 2147483647,
            },
            increment: 1,
            cache_size: 1,
            is_cyclic: false,
            owned_by_table: Some(table.name.clone()),
            owned_by_column: Some(column.to_string()),
            implicit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionKind {
    Hash,
    Range,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStrategy {
    #[serde(rename = "type")]
    pub kind: PartitionKind,
    pub columns: Vec<String>,
}

/// Binds a child partition table to its parent — populated either directly
/// (parent already known) or via [`crate::parser::pending::PendingAttachments`]
/// when the partition was declared before its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionBound {
    pub parent: QualifiedName,
    /// Verbatim `FOR VALUES ...` clause text.
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub partition_strategy: Option<PartitionStrategy>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub partition_of: Option<PartitionBound>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tablespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
}

impl Table {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            partition_strategy: None,
            partition_of: None,
            tablespace: None,
            comment: None,
            owner: None,
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| crate::normalize::identifiers_eq(&c.name, name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedKind {
    Always,
    ByDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub generated: GeneratedKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub ordinal: i32,
    pub is_nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub precision: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scale: Option<i32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_array: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub identity: Option<IdentityMetadata>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ordinal,
            is_nullable: true,
            default: None,
            max_length: None,
            precision: None,
            scale: None,
            is_array: false,
            identity: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConstraintKind {
    PrimaryKey = 0,
    Unique = 1,
    ForeignKey = 2,
    Check = 3,
    Exclude = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub referenced_table: Option<QualifiedName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub on_delete: Option<ReferentialAction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub on_update: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deferrable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub initially_deferred: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub check_expression: Option<String>,
}

/// Generates a constraint name following the `{table}_{cols}_{suffix}`
/// convention, used whenever a constraint is declared inline (without an
/// explicit `CONSTRAINT name` clause).
pub fn generate_constraint_name(table: &str, columns: &[String], kind: ConstraintKind) -> String {
    let suffix = match kind {
        ConstraintKind::PrimaryKey => "pkey",
        ConstraintKind::Unique => "key",
        ConstraintKind::ForeignKey => "fkey",
        ConstraintKind::Check => "check",
        ConstraintKind::Exclude => "exclude",
    };
    if columns.is_empty() {
        format!("{table}_{suffix}")
    } else {
        format!("{table}_{}_{suffix}", columns.join("_"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub table: QualifiedName,
    pub index_type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_primary: bool,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub storage_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tablespace: Option<String>,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedView {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub with_data: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tablespace: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgMode {
    In,
    Out,
    InOut,
    Variadic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArgument {
    pub mode: ArgMode,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Volatility {
    Immutable,
    Stable,
    Volatile,
}

impl Default for Volatility {
    fn default() -> Self {
        Volatility::Volatile
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub arguments: Vec<FunctionArgument>,
    pub return_type: String,
    pub language: String,
    pub body: String,
    #[serde(default)]
    pub volatility: Volatility,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_strict: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_security_definer: bool,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl Function {
    /// `schema.name(type1,type2,...)` — the identity a differ/sort uses to
    /// distinguish overloads.
    pub fn signature(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|a| a.data_type.clone())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerTiming {
    Before,
    After,
    #[serde(rename = "INSTEAD OF")]
    InsteadOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub table: QualifiedName,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub for_each_row: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub when_predicate: Option<String>,
    pub function: QualifiedName,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionSettings {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compress_after: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segment_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub drop_after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypertable {
    pub table: QualifiedName,
    pub time_column: String,
    pub time_column_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chunk_time_interval: Option<String>,
    #[serde(default)]
    pub dimensions: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub space_partitions: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compression: Option<CompressionSettings>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub retention: Option<RetentionPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPolicy {
    pub start_offset: String,
    pub end_offset: String,
    pub schedule_interval: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousAggregate {
    #[serde(flatten)]
    pub name: QualifiedName,
    pub hypertable: QualifiedName,
    pub definition: String,
    #[serde(default = "default_true")]
    pub materialized: bool,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default = "default_true")]
    pub with_data: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refresh_policy: Option<RefreshPolicy>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

/// A thing that can host an index: a table, a materialized view, or a
/// continuous aggregate. Modeled as a sum type with a small lookup so the
/// index handler tries each host kind in order, per the design note on
/// polymorphism over "thing that can hold indexes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHostKind {
    Table,
    MaterializedView,
    ContinuousAggregate,
}

impl SchemaModel {
    /// Resolves an index's target name against tables, then materialized
    /// views, then continuous aggregates, in that order, and attaches the
    /// index to whichever host is found. Returns `false` (caller should warn)
    /// if no host matches.
    pub fn attach_index(&mut self, target: &QualifiedName, index: Index) -> bool {
        if let Some(table) = self.find_table_mut(target) {
            table.indexes.push(index);
            return true;
        }
        if let Some(mview) = self
            .materialized_views
            .iter_mut()
            .find(|v| crate::normalize::qualified_names_eq(&v.name, target))
        {
            mview.indexes.push(index);
            return true;
        }
        if let Some(cagg) = self
            .continuous_aggregates
            .iter_mut()
            .find(|c| crate::normalize::qualified_names_eq(&c.name, target))
        {
            cagg.indexes.push(index);
            return true;
        }
        false
    }

    pub fn index_host_kind(&self, target: &QualifiedName) -> Option<IndexHostKind> {
        if self.find_table(target).is_some() {
            return Some(IndexHostKind::Table);
        }
        if self
            .materialized_views
            .iter()
            .any(|v| crate::normalize::qualified_names_eq(&v.name, target))
        {
            return Some(IndexHostKind::MaterializedView);
        }
        if self
            .continuous_aggregates
            .iter()
            .any(|c| crate::normalize::qualified_names_eq(&c.name, target))
        {
            return Some(IndexHostKind::ContinuousAggregate);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_table_overwrites_same_key() {
        let mut model = SchemaModel::new();
        let name = QualifiedName::new("public", "users");
        model.upsert_table(Table::new(name.clone()));
        let mut second = Table::new(name.clone());
        second.comment = Some("v2".to_string());
        model.upsert_table(second);
        assert_eq!(model.tables.len(), 1);
        assert_eq!(model.tables[0].comment.as_deref(), Some("v2"));
    }

    #[test]
    fn generated_constraint_name_follows_convention() {
        assert_eq!(
            generate_constraint_name("users", &["id".to_string()], ConstraintKind::PrimaryKey),
            "users_id_pkey"
        );
        assert_eq!(
            generate_constraint_name("users", &["email".to_string()], ConstraintKind::Unique),
            "users_email_key"
        );
    }

    #[test]
    fn sequence_for_serial_is_implicit() {
        let table = QualifiedName::new("public", "x");
        let seq = Sequence::default_for_serial(&table, "id", "INTEGER");
        assert!(seq.implicit);
        assert_eq!(seq.name.name, "x_id_seq");
    }

    #[test]
    fn json_roundtrip_minimal_model() {
        let mut model = SchemaModel::new();
        model.database_name = Some("app".to_string());
        let mut table = Table::new(QualifiedName::new("public", "t"));
        table.columns.push(Column::new("id", "INTEGER", 1));
        model.tables.push(table);

        let json = serde_json::to_string(&model).unwrap();
        let back: SchemaModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tables.len(), 1);
        assert_eq!(back.tables[0].columns[0].name, "id");
    }

    #[test]
    fn unknown_json_keys_are_ignored() {
        let json = r#"{"version":"1.0","tables":[],"unknown_field_from_future_extractor":42}"#;
        let model: SchemaModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.version, "1.0");
    }
}
