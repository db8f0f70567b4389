//! Storage endpoints (nouns)
//!
//! The `StorageBackend` contract, the local and in-memory backends, storage groups keyed by
//! environment and the environment variables that select among them.

mod backend;
mod env;
mod error;
mod format;
mod group;
mod local;
mod memory;
mod uri;

pub use backend::{IfExists, StorageBackend, WriteOptions};
pub use env::{
    group_variable, selected_environment, set_global_env, set_global_env_in, EnvLookup, EnvStore, ProcessEnv,
    GLOBAL_ENVIRONMENT_VAR,
};
pub use error::StorageError;
pub use format::{FileFormat, UnknownFormat};
pub use group::{Storage, StorageGroup, StorageRef};
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use uri::Uri;
