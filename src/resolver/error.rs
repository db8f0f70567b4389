use std::fmt;

use crate::storage::FileFormat;

/// Errors that can occur while picking storage, environment and format
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No storage passed and the model declares none
    MissingStorage { model: String },
    /// Neither environment variable selects a storage of the group
    CannotResolveEnvironment {
        group: String,
        variable: String,
        value: Option<String>,
        environments: Vec<String>,
    },
    /// An explicit environment label that the group does not declare
    UnknownEnvironment {
        group: String,
        environment: String,
        environments: Vec<String>,
    },
    /// The storage needs a format and none was resolved
    FormatNeeded { storage: String, table: String },
    /// The resolved format (or table-name suffix) is not handled by the storage
    FormatNotSupported {
        storage: String,
        format: String,
        supported: Vec<FileFormat>,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::MissingStorage { model } => {
                write!(f, "No storage given and model '{}' declares none in its Meta", model)
            }
            ResolveError::CannotResolveEnvironment { group, variable, value: None, .. } => write!(
                f,
                "Neither {} nor {} is set, cannot resolve the storage of group '{}'",
                crate::storage::GLOBAL_ENVIRONMENT_VAR,
                variable,
                group
            ),
            ResolveError::CannotResolveEnvironment { group, variable, value: Some(value), environments } => write!(
                f,
                "{} selects environment '{}' which storage group '{}' does not declare (available: {})",
                variable,
                value,
                group,
                environments.join(", ")
            ),
            ResolveError::UnknownEnvironment { group, environment, environments } => write!(
                f,
                "Environment '{}' not found in storage group '{}' (available: {})",
                environment,
                group,
                environments.join(", ")
            ),
            ResolveError::FormatNeeded { storage, table } => write!(
                f,
                "Storage '{}' needs a format to address table '{}'; pass one, set it in Meta or add a suffix to the table name",
                storage, table
            ),
            ResolveError::FormatNotSupported { storage, format, supported } => {
                let supported: Vec<String> = supported.iter().map(|f| f.to_string()).collect();
                write!(
                    f,
                    "Storage '{}' does not support format '{}', supported formats: [{}]",
                    storage,
                    format,
                    supported.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}
