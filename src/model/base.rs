//! The user-facing model
//!
//! A `Model` owns its prepared `Options` and delegates every table access to the resolver.

use arrow::array::ArrayRef;
use arrow::datatypes::DataType as ArrowType;
use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{ConfigError, Result, ValidationError};
use crate::frame::{ColumnExpr, FrameError, Table};
use crate::resolver::{self, ReadOptions, SaveOptions, SaveReport};
use super::columns::Columns;
use super::options::{prepare, Calculation, Meta, ModelDeclaration, Options};

/// Data handed to a model directly, bypassing calculation and storage
#[derive(Debug, Clone)]
pub enum InputData {
    Table(Table),
    /// Named Arrow arrays
    Columns(Vec<(String, ArrayRef)>),
    /// JSON objects, one per row
    Rows(Vec<Value>),
}

impl InputData {
    /// Materialize the data; rows are laid out on the declared `columns`
    pub fn into_table(self, columns: &Columns) -> std::result::Result<Table, FrameError> {
        match self {
            InputData::Table(table) => Ok(table),
            InputData::Columns(arrays) => Table::from_columns(arrays),
            InputData::Rows(rows) => {
                let declared: Vec<(String, ArrowType)> = columns
                    .iter()
                    .map(|column| (column.physical_name().to_string(), column.kind.default_type()))
                    .collect();
                Table::from_rows_with(&rows, &declared)
            }
        }
    }
}

impl From<Table> for InputData {
    fn from(table: Table) -> Self {
        InputData::Table(table)
    }
}

impl From<RecordBatch> for InputData {
    fn from(batch: RecordBatch) -> Self {
        InputData::Table(Table::new(batch))
    }
}

impl From<Vec<(String, ArrayRef)>> for InputData {
    fn from(columns: Vec<(String, ArrayRef)>) -> Self {
        InputData::Columns(columns)
    }
}

impl From<Vec<Value>> for InputData {
    fn from(rows: Vec<Value>) -> Self {
        InputData::Rows(rows)
    }
}

/// One-shot slot for constructor data
#[derive(Debug, Default)]
struct PendingSource {
    data: Mutex<Option<InputData>>,
}

impl PendingSource {
    fn set(&self, data: InputData) {
        let mut slot = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(data);
    }

    fn take(&self) -> Option<InputData> {
        let mut slot = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.take()
    }

    fn is_set(&self) -> bool {
        let slot = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.is_some()
    }
}

/// A declared tabular data model
pub struct Model {
    pub name: String,
    pub options: Options,
    meta: Meta,
    calculation: Option<Calculation>,
    pending: PendingSource,
}

impl Model {
    /// Prepare a declaration into a model
    pub fn new(declaration: ModelDeclaration) -> std::result::Result<Arc<Model>, ConfigError> {
        let options = prepare(&declaration)?;
        let meta = declaration.effective_meta()?.clone();
        log::debug!(
            "Prepared model '{}' with columns [{}]",
            declaration.name,
            options.columns.declared_names().join(", ")
        );
        Ok(Arc::new(Model {
            name: declaration.name,
            options,
            meta,
            calculation: declaration.calculation,
            pending: PendingSource::default(),
        }))
    }

    /// The Meta block in effect, own or inherited
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn columns(&self) -> &Columns {
        &self.options.columns
    }

    /// Symbolic reference to a declared column, under its physical name
    pub fn column(&self, name: &str) -> std::result::Result<ColumnExpr, ValidationError> {
        self.options
            .columns
            .get(name)
            .map(|column| ColumnExpr::new(column.physical_name()))
            .ok_or_else(|| ValidationError::ColumnNotExists {
                model: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn has_calculation(&self) -> bool {
        self.calculation.is_some()
    }

    /// Run the model's calculation
    pub fn calculate_data(&self) -> Result<Table> {
        match &self.calculation {
            Some(calculation) => {
                log::debug!("Calculating data for model '{}'", self.name);
                calculation()
            }
            None => Err(ConfigError::CalculateNotImplemented { model: self.name.clone() }.into()),
        }
    }

    /// Provide the data of the next access; consumed by that access
    pub fn from_data(&self, data: impl Into<InputData>) {
        self.pending.set(data.into());
    }

    /// Provide the next access's data as instances of this model
    pub fn from_instances(&self, instances: &[ModelInstance]) {
        let rows = instances.iter().map(|instance| self.instance_row(instance)).collect();
        self.from_data(InputData::Rows(rows));
    }

    pub fn has_pending_data(&self) -> bool {
        self.pending.is_set()
    }

    pub(crate) fn take_pending(&self) -> Option<InputData> {
        self.pending.take()
    }

    /// Build a row of this model from declared-name values
    pub fn instance<I, S>(&self, values: I) -> std::result::Result<ModelInstance, ValidationError>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut instance = ModelInstance {
            model: self.name.clone(),
            values: Vec::new(),
        };
        for (name, value) in values {
            let name = name.into();
            if !self.options.columns.contains(&name) {
                return Err(ValidationError::ColumnNotExists {
                    model: self.name.clone(),
                    column: name,
                });
            }
            instance.values.push((name, value));
        }
        Ok(instance)
    }

    /// JSON row keyed by physical names; undeclared values become null
    fn instance_row(&self, instance: &ModelInstance) -> Value {
        let row: Map<String, Value> = self
            .options
            .columns
            .iter()
            .map(|column| {
                let value = column
                    .declared_name()
                    .and_then(|name| instance.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                (column.physical_name().to_string(), value)
            })
            .collect();
        Value::Object(row)
    }

    /// Materialize the table with default resolution
    pub fn df(&self) -> Result<Table> {
        self.df_with(&ReadOptions::default())
    }

    /// Materialize the table with explicit storage, environment or format
    pub fn df_with(&self, options: &ReadOptions<'_>) -> Result<Table> {
        resolver::materialize(self, options)
    }

    /// Materialize the table and write it to storage
    pub fn save(&self, options: &SaveOptions<'_>) -> Result<SaveReport> {
        resolver::save(self, options)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("has_calculation", &self.calculation.is_some())
            .field("pending", &self.pending.is_set())
            .finish()
    }
}

/// One row of a model, keyed by declared column names
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    pub model: String,
    values: Vec<(String, Value)>,
}

impl ModelInstance {
    /// Value of a declared column
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}
