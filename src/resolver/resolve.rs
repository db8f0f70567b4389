//! Materialization and save

use crate::error::Result;
use crate::frame::Table;
use crate::model::Model;
use super::format::resolve_format;
use super::source::load;
use super::storage::resolve_storage;
use super::types::{ReadOptions, SaveOptions, SaveReport};
use super::validate::normalize;

/// Resolve, validate and return a model's table
pub fn materialize(model: &Model, options: &ReadOptions<'_>) -> Result<Table> {
    let (table, source) = load(model, options)?;
    log::debug!("Model '{}' loaded {} rows from {}", model.name, table.num_rows(), source);
    normalize(&model.name, &model.options, table)
}

/// Materialize a model's table and write it
///
/// The table is produced with default read resolution; the overrides only choose where
/// it is written.
pub fn save(model: &Model, options: &SaveOptions<'_>) -> Result<SaveReport> {
    let meta = &model.options;
    let table_name = options.table_name.clone().unwrap_or_else(|| meta.table_name.clone());
    let storage = resolve_storage(
        &model.name,
        options.to.as_ref(),
        meta.storage.as_ref(),
        options.environment.as_deref(),
        options.env,
    )?;
    let format = resolve_format(options.format, meta.format, &table_name, &storage)?;

    let table = materialize(model, &ReadOptions::with_env(options.env))?;
    let written = match format {
        Some(format) if format.is_text() => render_dates(model, &table)?,
        _ => table.clone(),
    };
    storage
        .backend
        .write(&written, &table_name, format, &options.write)?;

    let report = SaveReport {
        storage: storage.name.clone(),
        environment: storage.environment.clone(),
        table_name,
        format,
        rows: table.num_rows(),
    };
    log::info!("Model '{}' saved {}", model.name, report);
    Ok(report)
}

/// Write date and datetime columns in their declared formats so reads parse them back
fn render_dates(model: &Model, table: &Table) -> Result<Table> {
    let mut rendered = table.clone();
    for column in model.columns().iter() {
        if let Some(format) = column.text_format() {
            if rendered.has_column(column.physical_name()) {
                rendered = rendered.format_temporal(column.physical_name(), format)?;
            }
        }
    }
    Ok(rendered)
}
