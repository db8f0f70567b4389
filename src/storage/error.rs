use std::fmt;

use crate::frame::FrameError;
use super::format::FileFormat;

/// Errors raised by storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure on a storage path
    Io {
        path: String,
        source: std::io::Error,
    },
    /// Encoding or decoding a table failed
    Codec(FrameError),
    /// The addressed table does not exist in the storage
    TableNotFound { storage: String, table: String },
    /// The backend cannot read or write this format
    UnsupportedFormat { storage: String, format: FileFormat },
    /// A file-based backend was called without a format
    MissingFormat { storage: String, table: String },
    /// The backend cannot honour the requested write mode
    UnsupportedWriteMode { storage: String, mode: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, source } => write!(f, "Storage IO error on '{}': {}", path, source),
            StorageError::Codec(err) => write!(f, "Codec error: {}", err),
            StorageError::TableNotFound { storage, table } => {
                write!(f, "Table '{}' not found in storage '{}'", table, storage)
            }
            StorageError::UnsupportedFormat { storage, format } => {
                write!(f, "Storage '{}' cannot handle format '{}'", storage, format)
            }
            StorageError::MissingFormat { storage, table } => {
                write!(f, "Storage '{}' needs a format to address table '{}'", storage, table)
            }
            StorageError::UnsupportedWriteMode { storage, mode } => {
                write!(f, "Storage '{}' does not support write mode '{}'", storage, mode)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FrameError> for StorageError {
    fn from(err: FrameError) -> Self {
        StorageError::Codec(err)
    }
}
