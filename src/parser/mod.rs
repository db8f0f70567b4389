//! Project parser (verb module)
//!
//! Transforms YAML project files into a `Catalog` of storage groups and models.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ParseError};
use crate::model::{Catalog, Column, ColumnKind, DataType, Meta, MetaValue, Model, ModelDeclaration};
use crate::storage::{LocalStorage, MemoryStorage, Storage, StorageGroup};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDoc {
    #[serde(default)]
    storage_groups: Vec<StorageGroupDoc>,
    #[serde(default)]
    models: Vec<ModelDoc>,
}

#[derive(Debug, Deserialize)]
struct StorageGroupDoc {
    name: String,
    storages: Vec<StorageDoc>,
}

#[derive(Debug, Deserialize)]
struct StorageDoc {
    name: String,
    /// Defaults to the storage name
    #[serde(default)]
    environment: Option<String>,
    #[serde(flatten)]
    backend: BackendDoc,
}

/// Backend configuration, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BackendDoc {
    Local { path: String },
    Memory,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDoc {
    name: String,
    #[serde(default)]
    extends: Vec<String>,
    #[serde(default)]
    columns: Vec<ColumnDoc>,
    #[serde(default)]
    meta: Option<Mapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnDoc {
    name: String,
    #[serde(default)]
    kind: Option<ColumnKind>,
    #[serde(default)]
    dtype: Option<DataType>,
    #[serde(default)]
    unique: bool,
    #[serde(default = "default_true")]
    enforce_dtype: bool,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    column_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ColumnDoc {
    fn into_column(self) -> (String, Column) {
        // Without a kind, the declared dtype picks one
        let kind = self
            .kind
            .or_else(|| self.dtype.as_ref().map(ColumnKind::for_dtype))
            .unwrap_or(ColumnKind::Any);

        let mut column = Column::new(kind).enforce_dtype(self.enforce_dtype);
        column.dtype = self.dtype;
        column.unique = self.unique;
        column.column_name = self.column_name;
        if let Some(format) = self.format {
            column = column.with_format(format);
        }
        (self.name, column)
    }
}

/// Parse a project from a YAML file
///
/// Relative local storage paths are resolved against the file's directory.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Catalog, ParseError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })?;
    let doc: ProjectDoc = serde_yaml::from_str(&contents)?;
    build(doc, path.as_ref().parent())
}

/// Parse a project from a YAML string
pub fn parse_str(yaml: &str) -> Result<Catalog, ParseError> {
    let doc: ProjectDoc = serde_yaml::from_str(yaml)?;
    build(doc, None)
}

fn build(doc: ProjectDoc, base_dir: Option<&Path>) -> Result<Catalog, ParseError> {
    let mut catalog = Catalog::new();

    for group in doc.storage_groups {
        let storages = group
            .storages
            .into_iter()
            .map(|storage| {
                let built = match storage.backend {
                    BackendDoc::Local { path } => Storage::new(&storage.name, LocalStorage::new(local_path(&path, base_dir))),
                    BackendDoc::Memory => Storage::new(&storage.name, MemoryStorage::new(&storage.name)),
                };
                match storage.environment {
                    Some(environment) => built.with_environment(environment),
                    None => built,
                }
            })
            .collect();
        catalog.storage_groups.push(StorageGroup::new(group.name, storages)?);
    }

    for model in doc.models {
        let mut declaration = ModelDeclaration::new(&model.name);
        for parent in &model.extends {
            let parent = catalog.get_model(parent).ok_or_else(|| ConfigError::UnknownParent {
                model: model.name.clone(),
                parent: parent.clone(),
            })?;
            declaration = declaration.extends(parent);
        }
        for column in model.columns {
            let (name, column) = column.into_column();
            declaration = declaration.column(name, column);
        }
        if let Some(meta) = &model.meta {
            declaration = declaration.meta(build_meta(&catalog, meta)?);
        }
        catalog.models.push(Model::new(declaration)?);
    }

    Ok(catalog)
}

fn local_path(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(path);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

/// Meta keys pass through verbatim so `prepare` reports unsupported keys and values
fn build_meta(catalog: &Catalog, mapping: &Mapping) -> Result<Meta, ParseError> {
    let mut meta = Meta::new();
    for (key, value) in mapping {
        let key = match key {
            Value::String(key) => key.clone(),
            other => scalar_text(other),
        };
        let value = match (key.as_str(), value) {
            ("storage", Value::String(reference)) => MetaValue::Storage(catalog.storage_ref(reference)?),
            ("columns", Value::Sequence(_)) => {
                let docs: Vec<ColumnDoc> = serde_yaml::from_value(value.clone())?;
                MetaValue::Columns(docs.into_iter().map(ColumnDoc::into_column).collect())
            }
            (_, Value::String(text)) => MetaValue::Text(text.clone()),
            (_, Value::Bool(flag)) => MetaValue::Bool(*flag),
            (_, Value::Null) => MetaValue::Null,
            (_, other) => MetaValue::Other(scalar_text(other)),
        };
        meta = meta.set(key, value);
    }
    Ok(meta)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}
