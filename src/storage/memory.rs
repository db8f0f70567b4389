//! In-memory table backend
//!
//! Stands in for engine-style storages: tables are addressed by name, no format is
//! involved and reads project the requested columns.

use std::collections::HashMap;
use std::sync::RwLock;

use arrow::record_batch::RecordBatch;

use crate::frame::Table;
use super::backend::{IfExists, StorageBackend, WriteOptions};
use super::error::StorageError;
use super::format::FileFormat;
use super::uri::Uri;

/// Storage holding tables in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub name: String,
    tables: RwLock<HashMap<String, RecordBatch>>,
}

impl MemoryStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Names of the stored tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl StorageBackend for MemoryStorage {
    fn read(
        &self,
        table_name: &str,
        columns: &[String],
        _format: Option<FileFormat>,
    ) -> Result<Table, StorageError> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let batch = tables.get(table_name).ok_or_else(|| StorageError::TableNotFound {
            storage: self.name.clone(),
            table: table_name.to_string(),
        })?;
        let table = Table::new(batch.clone());
        if columns.is_empty() {
            return Ok(table);
        }

        // Columns the table lacks are left for validation to report
        let present: Vec<&String> = columns.iter().filter(|c| table.has_column(c)).collect();
        Ok(table.select(&present)?)
    }

    fn write(
        &self,
        table: &Table,
        table_name: &str,
        _format: Option<FileFormat>,
        options: &WriteOptions,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let batch = match (options.if_exists, tables.get(table_name)) {
            (IfExists::Append, Some(existing)) => Table::new(existing.clone()).concat(table)?.into_batch(),
            _ => table.batch().clone(),
        };
        tables.insert(table_name.to_string(), batch);
        Ok(())
    }

    fn exists(&self, table_name: &str, _format: Option<FileFormat>) -> Result<bool, StorageError> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tables.contains_key(table_name))
    }

    fn supported_formats(&self) -> &[FileFormat] {
        &[]
    }

    fn needs_format(&self) -> bool {
        false
    }

    fn uri(&self) -> Uri {
        Uri {
            path: self.name.clone(),
            ..Default::default()
        }
        .with_scheme("memory")
    }
}
