//! Dataframe adapter (nouns)
//!
//! Arrow `RecordBatch` wrapped by `Table`, plus the column expressions and file codecs
//! the resolution engine works with.

mod error;
mod expr;
pub mod io;
mod table;

pub use error::FrameError;
pub use expr::{CastExpr, ColumnExpr};
pub use table::Table;
