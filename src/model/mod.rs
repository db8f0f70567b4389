//! Model types (nouns)
//!
//! Columns, their collections, model configuration and the `Model` façade itself.

mod base;
mod catalog;
mod column;
mod columns;
mod factory;
mod options;
mod types;

pub use base::{InputData, Model, ModelInstance};
pub use catalog::Catalog;
pub use column::{Column, ColumnKind, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT};
pub use columns::{ColumnAttr, Columns};
pub use factory::{Generator, ModelFactory};
pub use options::{prepare, Calculation, Meta, MetaValue, ModelDeclaration, Options, Recalculate, SUPPORTED_META_KEYS};
pub use types::{DataType, ParseDataTypeError};
