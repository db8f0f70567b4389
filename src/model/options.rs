//! Model configuration
//!
//! A model is declared in two phases. `ModelDeclaration` collects what the user wrote
//! (columns, a `Meta` attribute bag, parents, an optional calculation); `prepare` turns it
//! into the immutable `Options` the resolution engine reads.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::frame::Table;
use crate::storage::{FileFormat, StorageRef};
use super::column::Column;
use super::columns::Columns;
use super::base::Model;

/// Meta keys that become `Options` fields
pub const SUPPORTED_META_KEYS: [&str; 6] = [
    "storage",
    "table_name",
    "auto_select",
    "recalculate",
    "format",
    "columns",
];

/// When a model recomputes its table instead of reading storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Recalculate {
    /// Always run the calculation
    Always,
    /// Always read from storage
    #[default]
    Never,
    /// Run the calculation only when storage has no table yet
    IfNotDataInStorage,
}

impl From<bool> for Recalculate {
    fn from(value: bool) -> Self {
        if value {
            Recalculate::Always
        } else {
            Recalculate::Never
        }
    }
}

impl FromStr for Recalculate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" | "true" => Ok(Recalculate::Always),
            "never" | "false" => Ok(Recalculate::Never),
            "if_not_data_in_storage" => Ok(Recalculate::IfNotDataInStorage),
            _ => Err(format!("Unknown recalculate policy '{}'", s)),
        }
    }
}

impl fmt::Display for Recalculate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recalculate::Always => write!(f, "always"),
            Recalculate::Never => write!(f, "never"),
            Recalculate::IfNotDataInStorage => write!(f, "if_not_data_in_storage"),
        }
    }
}

/// A value in a `Meta` block
#[derive(Debug, Clone)]
pub enum MetaValue {
    Storage(StorageRef),
    Text(String),
    Bool(bool),
    Format(FileFormat),
    Recalculate(Recalculate),
    Columns(Vec<(String, Column)>),
    /// A value of no other kind, rendered as text; valid for no supported key
    Other(String),
    Null,
}

impl MetaValue {
    fn kind(&self) -> &'static str {
        match self {
            MetaValue::Storage(_) => "a storage",
            MetaValue::Text(_) => "text",
            MetaValue::Bool(_) => "a boolean",
            MetaValue::Format(_) => "a format",
            MetaValue::Recalculate(_) => "a recalculate policy",
            MetaValue::Columns(_) => "a column list",
            MetaValue::Other(_) => "an unrecognized value",
            MetaValue::Null => "null",
        }
    }
}

/// Ordered attribute bag configuring a model
#[derive(Debug, Clone, Default)]
pub struct Meta {
    entries: Vec<(String, MetaValue)>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing an earlier value
    pub fn set(mut self, key: impl Into<String>, value: MetaValue) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn storage(self, storage: impl Into<StorageRef>) -> Self {
        self.set("storage", MetaValue::Storage(storage.into()))
    }

    pub fn table_name(self, name: impl Into<String>) -> Self {
        self.set("table_name", MetaValue::Text(name.into()))
    }

    pub fn auto_select(self, auto_select: bool) -> Self {
        self.set("auto_select", MetaValue::Bool(auto_select))
    }

    pub fn recalculate(self, policy: impl Into<Recalculate>) -> Self {
        self.set("recalculate", MetaValue::Recalculate(policy.into()))
    }

    pub fn format(self, format: FileFormat) -> Self {
        self.set("format", MetaValue::Format(format))
    }

    /// Extra columns composed after the model's own
    pub fn columns<S: Into<String>>(self, columns: Vec<(S, Column)>) -> Self {
        let columns = columns.into_iter().map(|(name, c)| (name.into(), c)).collect();
        self.set("columns", MetaValue::Columns(columns))
    }
}

/// Calculation producing a model's table
pub type Calculation = Arc<dyn Fn() -> Result<Table> + Send + Sync>;

/// Everything declared for a model, before preparation
#[derive(Clone, Default)]
pub struct ModelDeclaration {
    pub name: String,
    /// Own columns in declaration order
    pub columns: Vec<(String, Column)>,
    pub meta: Option<Meta>,
    /// Parent models, nearest first
    pub parents: Vec<Arc<Model>>,
    pub calculation: Option<Calculation>,
}

impl ModelDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.push((name.into(), column));
        self
    }

    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn extends(mut self, parent: &Arc<Model>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    pub fn calculate<F>(mut self, calculation: F) -> Self
    where
        F: Fn() -> Result<Table> + Send + Sync + 'static,
    {
        self.calculation = Some(Arc::new(calculation));
        self
    }

    /// Own Meta, or the nearest parent's
    pub fn effective_meta(&self) -> std::result::Result<&Meta, ConfigError> {
        self.meta
            .as_ref()
            .or_else(|| self.parents.first().map(|parent| parent.meta()))
            .ok_or_else(|| ConfigError::MissingMeta { model: self.name.clone() })
    }
}

/// Prepared configuration of a model
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub storage: Option<StorageRef>,
    pub table_name: String,
    pub auto_select: bool,
    pub recalculate: Recalculate,
    pub format: Option<FileFormat>,
    pub columns: Columns,
}

/// Build the `Options` of a declaration
pub fn prepare(declaration: &ModelDeclaration) -> std::result::Result<Options, ConfigError> {
    let model = declaration.name.as_str();
    let meta = declaration.effective_meta()?;
    let own_meta = declaration.meta.is_some();

    let mut options = Options::default();
    let mut unsupported = Vec::new();
    let mut meta_columns: &[(String, Column)] = &[];

    for (key, value) in &meta.entries {
        if key.starts_with('_') {
            continue;
        }
        let invalid = || ConfigError::InvalidMetaValue {
            model: model.to_string(),
            key: key.clone(),
            expected: expected_kind(key),
        };
        match (key.as_str(), value) {
            (_, MetaValue::Null) if SUPPORTED_META_KEYS.contains(&key.as_str()) => {}
            ("storage", MetaValue::Storage(storage)) => options.storage = Some(storage.clone()),
            ("table_name", MetaValue::Text(name)) => options.table_name = name.clone(),
            ("auto_select", MetaValue::Bool(flag)) => options.auto_select = *flag,
            ("recalculate", MetaValue::Recalculate(policy)) => options.recalculate = *policy,
            ("recalculate", MetaValue::Bool(flag)) => options.recalculate = Recalculate::from(*flag),
            ("recalculate", MetaValue::Text(text)) => {
                options.recalculate = text.parse().map_err(|_| invalid())?;
            }
            ("format", MetaValue::Format(format)) => options.format = Some(*format),
            ("format", MetaValue::Text(text)) => {
                options.format = Some(text.parse().map_err(|_| invalid())?);
            }
            ("columns", MetaValue::Columns(columns)) => meta_columns = columns,
            (key, other) if SUPPORTED_META_KEYS.contains(&key) => {
                log::debug!("Meta key '{}' of model '{}' holds {}", key, model, other.kind());
                return Err(invalid());
            }
            (key, _) => unsupported.push(key.to_string()),
        }
    }

    if !unsupported.is_empty() {
        return Err(ConfigError::UnsupportedMetaKeys {
            model: model.to_string(),
            keys: unsupported,
        });
    }

    for (name, column) in &declaration.columns {
        options.columns.push(name, column.clone())?;
    }
    // An inherited Meta's columns already arrive through the parent's columns
    if own_meta {
        for (name, column) in meta_columns {
            options.columns.push(name, column.clone())?;
        }
    }
    for parent in &declaration.parents {
        options.columns.extend(&parent.options.columns)?;
    }

    Ok(options)
}

fn expected_kind(key: &str) -> &'static str {
    match key {
        "storage" => "a storage",
        "table_name" => "text",
        "auto_select" => "a boolean",
        "recalculate" => "'always', 'never', 'if_not_data_in_storage' or a boolean",
        "format" => "a file format",
        "columns" => "a column list",
        _ => "a supported value",
    }
}
