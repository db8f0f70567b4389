//! Local filesystem backend
//!
//! Tables are files under a directory: `<dir>/<table_name>` with the extension replaced
//! by the format's, so `orders` and `orders.json` both address `orders.json` for JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::frame::{io, Table};
use super::backend::{IfExists, StorageBackend, WriteOptions};
use super::error::StorageError;
use super::format::FileFormat;
use super::uri::Uri;

const LOCAL_FORMATS: [FileFormat; 3] = [FileFormat::Json, FileFormat::Csv, FileFormat::Parquet];

/// Storage backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pub path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path of a table file for a format
    pub fn file_path(&self, table_name: &str, format: FileFormat) -> PathBuf {
        self.path.join(table_name).with_extension(format.extension())
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn checked_format(&self, table_name: &str, format: Option<FileFormat>) -> Result<FileFormat, StorageError> {
        let format = format.ok_or_else(|| StorageError::MissingFormat {
            storage: self.name(),
            table: table_name.to_string(),
        })?;
        if !self.supports_format(format) {
            return Err(StorageError::UnsupportedFormat {
                storage: self.name(),
                format,
            });
        }
        Ok(format)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl StorageBackend for LocalStorage {
    fn read(
        &self,
        table_name: &str,
        _columns: &[String],
        format: Option<FileFormat>,
    ) -> Result<Table, StorageError> {
        let format = self.checked_format(table_name, format)?;
        let path = self.file_path(table_name, format);
        log::debug!("Reading '{}' as {}", path.display(), format);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::TableNotFound {
                    storage: self.name(),
                    table: path.display().to_string(),
                })
            }
            Err(err) => return Err(io_error(&path, err)),
        };

        let batch = match format {
            FileFormat::Json => io::read_json(BufReader::new(file))?,
            FileFormat::Csv => io::read_csv(BufReader::new(file))?,
            FileFormat::Parquet => io::read_parquet(file)?,
            other => {
                return Err(StorageError::UnsupportedFormat {
                    storage: self.name(),
                    format: other,
                })
            }
        };
        Ok(Table::new(batch))
    }

    fn write(
        &self,
        table: &Table,
        table_name: &str,
        format: Option<FileFormat>,
        options: &WriteOptions,
    ) -> Result<(), StorageError> {
        if options.if_exists != IfExists::Replace {
            return Err(StorageError::UnsupportedWriteMode {
                storage: self.name(),
                mode: options.if_exists.to_string(),
            });
        }
        let format = self.checked_format(table_name, format)?;
        let path = self.file_path(table_name, format);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
        let file = File::create(&path).map_err(|err| io_error(&path, err))?;
        let mut writer = BufWriter::new(file);

        match format {
            FileFormat::Json => io::write_json(&mut writer, table.batch())?,
            FileFormat::Csv => io::write_csv(&mut writer, table.batch())?,
            FileFormat::Parquet => io::write_parquet(&mut writer, table.batch())?,
            other => {
                return Err(StorageError::UnsupportedFormat {
                    storage: self.name(),
                    format: other,
                })
            }
        }
        writer.flush().map_err(|err| io_error(&path, err))?;
        Ok(())
    }

    fn exists(&self, table_name: &str, format: Option<FileFormat>) -> Result<bool, StorageError> {
        let format = self.checked_format(table_name, format)?;
        let path = self.file_path(table_name, format);
        path.try_exists().map_err(|err| io_error(&path, err))
    }

    fn supported_formats(&self) -> &[FileFormat] {
        &LOCAL_FORMATS
    }

    fn needs_format(&self) -> bool {
        true
    }

    fn uri(&self) -> Uri {
        Uri::path(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
            ("name", Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef),
        ])
        .unwrap()
    }

    #[test]
    fn test_file_path_replaces_suffix() {
        let storage = LocalStorage::new("/data");
        assert_eq!(
            storage.file_path("orders.json", FileFormat::Json),
            PathBuf::from("/data/orders.json")
        );
        assert_eq!(
            storage.file_path("orders", FileFormat::Parquet),
            PathBuf::from("/data/orders.parquet")
        );
    }

    #[test]
    fn test_write_read_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        for format in LOCAL_FORMATS {
            assert!(!storage.exists("people", Some(format)).unwrap());
            storage
                .write(&sample(), "people", Some(format), &WriteOptions::default())
                .unwrap();
            assert!(storage.exists("people", Some(format)).unwrap());

            let table = storage.read("people", &[], Some(format)).unwrap();
            assert_eq!(table.batch().columns(), sample().batch().columns(), "format {}", format);
        }
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let result = storage.read("nothing", &[], Some(FileFormat::Csv));
        assert!(matches!(result, Err(StorageError::TableNotFound { .. })));
    }

    #[test]
    fn test_rejects_append_and_foreign_formats() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let append = WriteOptions { if_exists: IfExists::Append };
        let result = storage.write(&sample(), "people", Some(FileFormat::Csv), &append);
        assert!(matches!(result, Err(StorageError::UnsupportedWriteMode { .. })));

        let result = storage.write(&sample(), "people", Some(FileFormat::Avro), &WriteOptions::default());
        assert!(matches!(result, Err(StorageError::UnsupportedFormat { .. })));

        let result = storage.read("people", &[], None);
        assert!(matches!(result, Err(StorageError::MissingFormat { .. })));
    }

    #[test]
    fn test_uri_is_the_directory() {
        assert_eq!(LocalStorage::new("/tmp").uri().to_string(), "/tmp");
    }
}
