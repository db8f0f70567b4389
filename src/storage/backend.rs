//! The storage client contract

use std::fmt;

use crate::frame::Table;
use super::error::StorageError;
use super::format::FileFormat;
use super::uri::Uri;

/// What a write does when the target table already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IfExists {
    #[default]
    Replace,
    Append,
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IfExists::Replace => write!(f, "replace"),
            IfExists::Append => write!(f, "append"),
        }
    }
}

/// Options forwarded to `StorageBackend::write`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub if_exists: IfExists,
}

/// A physical storage client
///
/// File-based backends address tables as files and need a format; engine-style backends
/// address tables by name and ignore it.
pub trait StorageBackend: fmt::Debug + Send + Sync {
    /// Read a table, restricted to `columns` where the backend can project
    fn read(
        &self,
        table_name: &str,
        columns: &[String],
        format: Option<FileFormat>,
    ) -> Result<Table, StorageError>;

    /// Write a table
    fn write(
        &self,
        table: &Table,
        table_name: &str,
        format: Option<FileFormat>,
        options: &WriteOptions,
    ) -> Result<(), StorageError>;

    /// Whether the table exists
    fn exists(&self, table_name: &str, format: Option<FileFormat>) -> Result<bool, StorageError>;

    /// Formats this backend can read and write
    fn supported_formats(&self) -> &[FileFormat];

    /// Whether a format must be resolved before reading or writing
    fn needs_format(&self) -> bool;

    fn supports_format(&self, format: FileFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    /// Connection URI of the endpoint
    fn uri(&self) -> Uri;
}
