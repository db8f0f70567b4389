//! Resolution engine (verb module)
//!
//! Model + overrides → storage, format and source → validated table.

mod error;
mod format;
mod resolve;
mod source;
mod storage;
mod types;
mod validate;

pub use error::ResolveError;
pub use format::resolve_format;
pub use resolve::{materialize, save};
pub use storage::resolve_storage;
pub use types::{ReadOptions, SaveOptions, SaveReport, Source};
