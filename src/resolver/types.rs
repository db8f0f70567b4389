use std::fmt;

use crate::storage::{EnvLookup, FileFormat, ProcessEnv, StorageRef, WriteOptions};

/// Overrides for one table access
pub struct ReadOptions<'a> {
    /// Storage to read from instead of the Meta storage
    pub storage: Option<StorageRef>,
    /// Environment label to look up in the storage's group
    pub environment: Option<String>,
    /// Format instead of the Meta format or table-name suffix
    pub format: Option<FileFormat>,
    /// Where environment variables are read from
    pub env: &'a dyn EnvLookup,
}

impl Default for ReadOptions<'_> {
    fn default() -> Self {
        Self {
            storage: None,
            environment: None,
            format: None,
            env: &ProcessEnv,
        }
    }
}

impl<'a> ReadOptions<'a> {
    pub fn with_env(env: &'a dyn EnvLookup) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    pub fn storage(mut self, storage: impl Into<StorageRef>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Overrides for one save
pub struct SaveOptions<'a> {
    /// Storage to write to instead of the Meta storage
    pub to: Option<StorageRef>,
    pub environment: Option<String>,
    pub format: Option<FileFormat>,
    /// Table name instead of the Meta table name, for this write only
    pub table_name: Option<String>,
    pub write: WriteOptions,
    pub env: &'a dyn EnvLookup,
}

impl Default for SaveOptions<'_> {
    fn default() -> Self {
        Self {
            to: None,
            environment: None,
            format: None,
            table_name: None,
            write: WriteOptions::default(),
            env: &ProcessEnv,
        }
    }
}

impl<'a> SaveOptions<'a> {
    pub fn with_env(env: &'a dyn EnvLookup) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    pub fn to(mut self, storage: impl Into<StorageRef>) -> Self {
        self.to = Some(storage.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}

/// Where a save went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub storage: String,
    pub environment: String,
    pub table_name: String,
    pub format: Option<FileFormat>,
    pub rows: usize,
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows to '{}' in {}<environment={}>",
            self.rows, self.table_name, self.storage, self.environment
        )?;
        if let Some(format) = self.format {
            write!(f, " as {}", format)?;
        }
        Ok(())
    }
}

/// Which source produced a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Constructor,
    Calculation,
    Storage { storage: String, table_name: String },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Constructor => write!(f, "constructor data"),
            Source::Calculation => write!(f, "calculation"),
            Source::Storage { storage, table_name } => write!(f, "table '{}' of storage '{}'", table_name, storage),
        }
    }
}
