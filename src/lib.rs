//! datasaurus - Declarative data models backed by pluggable storages
//!
//! This library provides:
//! - Model declaration types (Model, Column, Meta) with inheritance
//! - Storage backends (local files, in-memory) grouped by environment
//! - Storage, format and source resolution for reads and writes
//! - Validation: column selection, dtype enforcement, deduplication
//! - Project parsing from YAML
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - domain concepts (Model, Column, Columns, Meta, Catalog, ModelFactory)
//! - `storage/` - storage backends, groups and environment selection
//! - `frame/` - Arrow-backed tables, cast expressions and file codecs
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → Catalog
//! - `resolver/` - Model + overrides → storage, format, source → validated Table
//!
//! # Example
//!
//! ```ignore
//! use datasaurus::{parser, ReadOptions, SaveOptions};
//!
//! let catalog = parser::parse_file("project.yaml")?;
//! let model = catalog.get_model("Author").unwrap();
//! let table = model.df_with(&ReadOptions::default().environment("local"))?;
//! let report = model.save(&SaveOptions::default().environment("continuous-integration"))?;
//! ```

pub mod error;
pub mod frame;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod storage;

// Re-export commonly used types
pub use error::{ConfigError, Error, ParseError, Result, ValidationError};
pub use frame::{CastExpr, ColumnExpr, FrameError, Table};
pub use model::{
    Catalog, Column, ColumnKind, Columns, DataType, InputData, Meta, MetaValue, Model, ModelDeclaration,
    ModelFactory, ModelInstance, Recalculate,
};
pub use resolver::{materialize, save, ReadOptions, ResolveError, SaveOptions, SaveReport, Source};
pub use storage::{
    FileFormat, IfExists, LocalStorage, MemoryStorage, Storage, StorageBackend, StorageError, StorageGroup,
    StorageRef, WriteOptions,
};
