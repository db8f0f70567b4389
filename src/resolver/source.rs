//! Data source selection
//!
//! Constructor data wins, then the recalculation policy, then a storage read.

use std::sync::Arc;

use crate::error::Result;
use crate::frame::Table;
use crate::model::{Model, Recalculate};
use crate::storage::{FileFormat, Storage};
use super::format::resolve_format;
use super::storage::resolve_storage;
use super::types::{ReadOptions, Source};

/// Storage, format and table name of a storage-backed access
pub(crate) struct Target {
    pub storage: Arc<Storage>,
    pub format: Option<FileFormat>,
    pub table_name: String,
}

/// Resolve where a model's table is read from
pub(crate) fn read_target(model: &Model, options: &ReadOptions<'_>) -> Result<Target> {
    let meta = &model.options;
    let storage = resolve_storage(
        &model.name,
        options.storage.as_ref(),
        meta.storage.as_ref(),
        options.environment.as_deref(),
        options.env,
    )?;
    let format = resolve_format(options.format, meta.format, &meta.table_name, &storage)?;
    Ok(Target {
        storage,
        format,
        table_name: meta.table_name.clone(),
    })
}

fn read(model: &Model, target: &Target) -> Result<Table> {
    let columns = model.options.columns.physical_names();
    Ok(target
        .storage
        .backend
        .read(&target.table_name, &columns, target.format)?)
}

/// Produce the raw table of an access and the source it came from
pub(crate) fn load(model: &Model, options: &ReadOptions<'_>) -> Result<(Table, Source)> {
    if let Some(data) = model.take_pending() {
        return Ok((data.into_table(&model.options.columns)?, Source::Constructor));
    }

    match model.options.recalculate {
        Recalculate::Always => Ok((model.calculate_data()?, Source::Calculation)),
        Recalculate::IfNotDataInStorage => {
            let target = read_target(model, options)?;
            if target.storage.backend.exists(&target.table_name, target.format)? {
                let table = read(model, &target)?;
                Ok((table, storage_source(&target)))
            } else {
                log::debug!(
                    "Table '{}' not in storage '{}', calculating model '{}'",
                    target.table_name,
                    target.storage.name,
                    model.name
                );
                Ok((model.calculate_data()?, Source::Calculation))
            }
        }
        Recalculate::Never => {
            let target = read_target(model, options)?;
            let table = read(model, &target)?;
            Ok((table, storage_source(&target)))
        }
    }
}

fn storage_source(target: &Target) -> Source {
    Source::Storage {
        storage: target.storage.name.clone(),
        table_name: target.table_name.clone(),
    }
}
