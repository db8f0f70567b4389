//! Post-materialization normalization

use crate::error::{Result, ValidationError};
use crate::frame::Table;
use crate::model::{ColumnAttr, Options};

/// Bring a raw table in line with the model's columns
///
/// Auto-select trims to the declared physical columns; every declared column must then be
/// present. Enforced columns are cast in place and rows are deduplicated on the unique
/// columns, first occurrence first.
pub(crate) fn normalize(model: &str, options: &Options, table: Table) -> Result<Table> {
    let declared = options.columns.physical_names();

    let mut table = if options.auto_select {
        let present: Vec<&String> = declared.iter().filter(|name| table.has_column(name)).collect();
        table.select(&present)?
    } else {
        table
    };

    if declared.iter().any(|name| !table.has_column(name)) {
        return Err(ValidationError::MissingColumns {
            model: model.to_string(),
            declared,
            found: table.column_names(),
        }
        .into());
    }

    for expr in options.columns.cast_expressions(&table.schema_types())? {
        if expr.is_keep() {
            continue;
        }
        log::debug!("Model '{}' applies {}", model, expr);
        table = table.apply(&expr)?;
    }

    let unique = options.columns.names_by_attributes(&[ColumnAttr::Unique(true)]);
    if !unique.is_empty() {
        let before = table.num_rows();
        table = table.dedupe(&unique)?;
        if table.num_rows() < before {
            log::warn!(
                "Model '{}' dropped {} duplicate rows on [{}]",
                model,
                before - table.num_rows(),
                unique.join(", ")
            );
        }
    }

    Ok(table)
}
