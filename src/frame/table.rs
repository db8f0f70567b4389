//! Materialized table
//!
//! A thin wrapper over an Arrow `RecordBatch` exposing the handful of operations the
//! resolution engine needs: construction, column selection, casting, deduplication and
//! schema inspection.

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, Date32Array, StringArray, TimestampMicrosecondArray, UInt32Array,
};
use arrow::compute::{cast, cast_with_options, concat_batches, take_record_batch, CastOptions};
use arrow::datatypes::{DataType as ArrowType, Date32Type, Field, FieldRef, Schema, TimeUnit, TimestampMicrosecondType};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{RowConverter, SortField};
use arrow::temporal_conversions::{date32_to_datetime, timestamp_us_to_datetime};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::io::Cursor;
use std::sync::Arc;

use super::error::FrameError;
use super::expr::CastExpr;
use super::io;

/// A materialized table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Build a table from named Arrow arrays
    pub fn from_columns<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        Ok(Self::new(RecordBatch::try_from_iter(columns)?))
    }

    /// Build a table from JSON objects, one per row, inferring column types
    pub fn from_rows(rows: &[Value]) -> Result<Self, FrameError> {
        let mut buffer = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buffer, row)?;
            buffer.push(b'\n');
        }
        Ok(Self::new(io::read_json(Cursor::new(buffer))?))
    }

    /// Build a table from JSON rows laid out on a declared schema
    ///
    /// Declared columns come first, in order. One the rows never fill (absent, all null,
    /// or no rows at all) holds nulls of its declared type. Columns only found in the
    /// rows follow in inferred order.
    pub fn from_rows_with(rows: &[Value], declared: &[(String, ArrowType)]) -> Result<Self, FrameError> {
        let inferred = if rows.is_empty() {
            None
        } else {
            Some(Self::from_rows(rows)?)
        };

        let mut fields: Vec<Field> = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (name, dtype) in declared {
            let array = match inferred.as_ref().and_then(|table| table.column(name)) {
                Some(array) if array.data_type() != &ArrowType::Null => Arc::clone(array),
                _ => new_null_array(dtype, rows.len()),
            };
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }
        if let Some(table) = &inferred {
            let schema = table.batch.schema();
            for (field, array) in schema.fields().iter().zip(table.batch.columns()) {
                if !declared.iter().any(|(name, _)| name == field.name()) {
                    fields.push(field.as_ref().clone());
                    arrays.push(Arc::clone(array));
                }
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Self::new(batch))
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Values of a column by name
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Current type of every column, keyed by column name
    pub fn schema_types(&self) -> HashMap<String, ArrowType> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| (field.name().clone(), field.data_type().clone()))
            .collect()
    }

    /// Keep only the named columns, in the order given
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, FrameError> {
        let schema = self.batch.schema();
        let indices = names
            .iter()
            .map(|name| {
                schema
                    .index_of(name.as_ref())
                    .map_err(|_| FrameError::ColumnNotFound(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(self.batch.project(&indices)?))
    }

    /// Apply a cast expression, replacing the column in place
    pub fn apply(&self, expr: &CastExpr) -> Result<Self, FrameError> {
        let column = expr.column();
        let schema = self.batch.schema();
        let index = schema
            .index_of(column)
            .map_err(|_| FrameError::ColumnNotFound(column.to_string()))?;
        let array = self.batch.column(index);

        let converted: ArrayRef = match expr {
            CastExpr::Keep { .. } => return Ok(self.clone()),
            CastExpr::Cast { to, .. } => {
                let options = CastOptions {
                    safe: false,
                    ..Default::default()
                };
                cast_with_options(array, to, &options)?
            }
            CastExpr::ParseDate { format, .. } => parse_dates(column, array, format)?,
            CastExpr::ParseDatetime { format, .. } => parse_datetimes(column, array, format)?,
        };
        self.replace(index, converted)
    }

    /// Render a date or timestamp column as strings in a chrono format
    ///
    /// Columns of any other type are left untouched. Timestamps are rendered as UTC.
    pub fn format_temporal(&self, column: &str, format: &str) -> Result<Self, FrameError> {
        let index = self
            .batch
            .schema()
            .index_of(column)
            .map_err(|_| FrameError::ColumnNotFound(column.to_string()))?;
        let array = self.batch.column(index);

        let rendered = match array.data_type() {
            ArrowType::Date32 => array
                .as_primitive::<Date32Type>()
                .iter()
                .map(|value| match value.map(|days| (days, date32_to_datetime(days))) {
                    None => Ok(None),
                    Some((_, Some(datetime))) => render(column, &datetime.date().format(format), format).map(Some),
                    Some((days, None)) => Err(out_of_range(column, days as i64)),
                })
                .collect::<Result<StringArray, _>>()?,
            ArrowType::Timestamp(_, _) => {
                let micros = cast(array, &ArrowType::Timestamp(TimeUnit::Microsecond, None))?;
                micros
                    .as_primitive::<TimestampMicrosecondType>()
                    .iter()
                    .map(|value| match value.map(|us| (us, timestamp_us_to_datetime(us))) {
                        None => Ok(None),
                        Some((_, Some(datetime))) => {
                            render(column, &datetime.and_utc().format(format), format).map(Some)
                        }
                        Some((us, None)) => Err(out_of_range(column, us)),
                    })
                    .collect::<Result<StringArray, _>>()?
            }
            _ => return Ok(self.clone()),
        };
        self.replace(index, Arc::new(rendered))
    }

    fn replace(&self, index: usize, array: ArrayRef) -> Result<Self, FrameError> {
        let schema = self.batch.schema();
        let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let name = fields[index].name().clone();
        fields[index] = Arc::new(Field::new(name, array.data_type().clone(), true));
        let mut columns = self.batch.columns().to_vec();
        columns[index] = array;

        let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
        Ok(Self::new(RecordBatch::try_new(Arc::new(schema), columns)?))
    }

    /// Drop rows whose key columns repeat an earlier row; the first occurrence wins
    pub fn dedupe<S: AsRef<str>>(&self, keys: &[S]) -> Result<Self, FrameError> {
        if keys.is_empty() || self.num_rows() == 0 {
            return Ok(self.clone());
        }

        let arrays = keys
            .iter()
            .map(|key| {
                self.column(key.as_ref())
                    .cloned()
                    .ok_or_else(|| FrameError::ColumnNotFound(key.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let converter = RowConverter::new(
            arrays
                .iter()
                .map(|array| SortField::new(array.data_type().clone()))
                .collect(),
        )?;
        let rows = converter.convert_columns(&arrays)?;

        let mut seen = HashSet::with_capacity(rows.num_rows());
        let mut keep = Vec::with_capacity(rows.num_rows());
        for (index, row) in rows.iter().enumerate() {
            if seen.insert(row) {
                keep.push(index as u32);
            }
        }

        if keep.len() == self.num_rows() {
            return Ok(self.clone());
        }
        let indices = UInt32Array::from(keep);
        Ok(Self::new(take_record_batch(&self.batch, &indices)?))
    }

    /// Append the rows of another table with the same schema
    pub fn concat(&self, other: &Table) -> Result<Self, FrameError> {
        let schema = self.batch.schema();
        Ok(Self::new(concat_batches(&schema, [&self.batch, &other.batch])?))
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

fn parse_dates(column: &str, array: &ArrayRef, format: &str) -> Result<ArrayRef, FrameError> {
    let strings = array.as_string_opt::<i32>().ok_or_else(|| FrameError::NotUtf8 {
        column: column.to_string(),
        found: array.data_type().clone(),
    })?;
    let epoch = NaiveDate::default();

    let days = strings
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, format)
                .map(|date| Some(date.signed_duration_since(epoch).num_days() as i32))
                .map_err(|_| parse_error(column, raw, format)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arc::new(Date32Array::from(days)))
}

fn parse_datetimes(column: &str, array: &ArrayRef, format: &str) -> Result<ArrayRef, FrameError> {
    let strings = array.as_string_opt::<i32>().ok_or_else(|| FrameError::NotUtf8 {
        column: column.to_string(),
        found: array.data_type().clone(),
    })?;
    // Offset-aware formats are normalized to UTC
    let with_offset = format.contains("%z") || format.contains("%:z") || format.contains("%#z");

    let micros = strings
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(raw) => {
                let parsed = if with_offset {
                    DateTime::parse_from_str(raw, format).map(|dt| dt.timestamp_micros())
                } else {
                    NaiveDateTime::parse_from_str(raw, format).map(|dt| dt.and_utc().timestamp_micros())
                };
                parsed
                    .map(Some)
                    .map_err(|_| parse_error(column, raw, format))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arc::new(TimestampMicrosecondArray::from(micros)))
}

fn render(column: &str, value: &dyn std::fmt::Display, format: &str) -> Result<String, FrameError> {
    let mut out = String::new();
    write!(out, "{}", value).map_err(|_| FrameError::Format {
        column: column.to_string(),
        format: format.to_string(),
    })?;
    Ok(out)
}

fn out_of_range(column: &str, value: i64) -> FrameError {
    FrameError::Arrow(arrow::error::ArrowError::ComputeError(format!(
        "Value {} in column '{}' is out of the calendar range",
        value, column
    )))
}

fn parse_error(column: &str, value: &str, format: &str) -> FrameError {
    FrameError::Parse {
        column: column.to_string(),
        value: value.to_string(),
        format: format.to_string(),
    }
}
