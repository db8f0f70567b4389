//! Format resolution

use crate::storage::{FileFormat, Storage};
use super::error::ResolveError;

/// Pick the format of an access: explicit, then Meta, then the table-name suffix
///
/// A storage that needs a format fails without one; a format the storage does not
/// support fails, unrecognized suffixes included.
pub fn resolve_format(
    explicit: Option<FileFormat>,
    meta: Option<FileFormat>,
    table_name: &str,
    storage: &Storage,
) -> Result<Option<FileFormat>, ResolveError> {
    let backend = &storage.backend;
    let unsupported = |format: String| ResolveError::FormatNotSupported {
        storage: storage.name.clone(),
        format,
        supported: backend.supported_formats().to_vec(),
    };

    let format = match explicit.or(meta) {
        Some(format) => Some(format),
        None => match FileFormat::split_suffix(table_name) {
            Some((_, suffix)) => {
                let format = suffix.parse::<FileFormat>().map_err(|_| unsupported(suffix.to_string()))?;
                log::debug!("Inferred format {} from table name '{}'", format, table_name);
                Some(format)
            }
            None => None,
        },
    };

    match format {
        None if backend.needs_format() => Err(ResolveError::FormatNeeded {
            storage: storage.name.clone(),
            table: table_name.to_string(),
        }),
        Some(format) if !backend.supports_format(format) => Err(unsupported(format.to_string())),
        format => Ok(format),
    }
}
