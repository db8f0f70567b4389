//! Error types for datasaurus

use arrow::datatypes::DataType as ArrowType;
use std::fmt;

use crate::frame::FrameError;
use crate::resolver::ResolveError;
use crate::storage::StorageError;

/// Shorthand for results carrying the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors in how models, columns and storages are declared
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Neither the model nor any parent declares a Meta block
    MissingMeta { model: String },
    /// Meta keys outside the allow-list
    UnsupportedMetaKeys { model: String, keys: Vec<String> },
    /// An allowed Meta key holding the wrong kind of value
    InvalidMetaValue {
        model: String,
        key: String,
        expected: &'static str,
    },
    /// Two columns with the same declared name
    ColumnCollision { column: String },
    /// A column bound to an empty name
    EmptyColumnName,
    /// A column bound a second time
    ColumnAlreadyBound { name: String, attempted: String },
    /// A column used before being placed in a collection
    UnboundColumn,
    /// Two members of a storage group share an environment label
    DuplicateEnvironment { group: String, environment: String },
    /// Recalculation requested on a model without a calculation
    CalculateNotImplemented { model: String },
    /// A storage reference names no known storage group or member
    UnknownStorageGroup(String),
    /// A model extends a model that is not declared before it
    UnknownParent { model: String, parent: String },
    /// A factory's attributes differ from its model's columns
    FactoryMismatch {
        model: String,
        attributes: Vec<String>,
        columns: Vec<String>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingMeta { model } => {
                write!(f, "Model '{}' declares no Meta and has no parent to inherit one from", model)
            }
            ConfigError::UnsupportedMetaKeys { model, keys } => {
                write!(f, "Meta of model '{}' has unsupported keys: {}", model, keys.join(", "))
            }
            ConfigError::InvalidMetaValue { model, key, expected } => {
                write!(f, "Meta key '{}' of model '{}' must be {}", key, model, expected)
            }
            ConfigError::ColumnCollision { column } => {
                write!(f, "Column '{}' is declared more than once", column)
            }
            ConfigError::EmptyColumnName => write!(f, "Column name cannot be empty"),
            ConfigError::ColumnAlreadyBound { name, attempted } => {
                write!(f, "Column '{}' is already bound, cannot rebind it as '{}'", name, attempted)
            }
            ConfigError::UnboundColumn => write!(f, "Column has not been bound to a name"),
            ConfigError::DuplicateEnvironment { group, environment } => {
                write!(f, "Storage group '{}' has more than one storage for environment '{}'", group, environment)
            }
            ConfigError::CalculateNotImplemented { model } => write!(
                f,
                "Model '{}' was asked to recalculate but has no calculation; \
                 add one or set recalculate to 'never'",
                model
            ),
            ConfigError::UnknownStorageGroup(name) => write!(f, "Storage group '{}' not found", name),
            ConfigError::UnknownParent { model, parent } => {
                write!(f, "Model '{}' extends '{}', which is not declared before it", model, parent)
            }
            ConfigError::FactoryMismatch { model, attributes, columns } => write!(
                f,
                "Factory of model '{}' defines [{}] but the model declares [{}]",
                model,
                attributes.join(", "),
                columns.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while checking a table against a model's columns
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Declared columns absent from the table
    MissingColumns {
        model: String,
        declared: Vec<String>,
        found: Vec<String>,
    },
    /// Explicit dtype already present on a column whose kind defaults to something else
    DtypeMismatch {
        column: String,
        dtype: ArrowType,
        default: ArrowType,
    },
    /// Target type outside the column kind's supported set
    UnsupportedDtype {
        column: String,
        dtype: ArrowType,
        supported: Vec<ArrowType>,
    },
    /// Instance value for a name that is not a declared column
    ColumnNotExists { model: String, column: String },
}

impl ValidationError {
    /// Declared columns that were not found, for `MissingColumns`
    pub fn missing(&self) -> Vec<&str> {
        match self {
            ValidationError::MissingColumns { declared, found, .. } => declared
                .iter()
                .filter(|name| !found.contains(*name))
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingColumns { model, declared, found } => write!(
                f,
                "Table for model '{}' is missing columns [{}]; declared [{}], found [{}]",
                model,
                self.missing().join(", "),
                declared.join(", "),
                found.join(", ")
            ),
            ValidationError::DtypeMismatch { column, dtype, default } => write!(
                f,
                "Column '{}' already holds {} but its kind defaults to {}; \
                 use the column kind matching {}",
                column, dtype, default, dtype
            ),
            ValidationError::UnsupportedDtype { column, dtype, supported } => {
                let supported: Vec<String> = supported.iter().map(|t| t.to_string()).collect();
                write!(
                    f,
                    "Column '{}' does not support dtype {}, supported: [{}]",
                    column,
                    dtype,
                    supported.join(", ")
                )
            }
            ValidationError::ColumnNotExists { model, column } => {
                write!(f, "Column '{}' does not exist in model '{}'", column, model)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors that can occur during parsing
#[derive(Debug)]
pub enum ParseError {
    /// IO error reading file
    Io {
        path: String,
        source: std::io::Error,
    },
    /// YAML deserialization error
    Yaml {
        source: serde_yaml::Error,
    },
    /// The document parsed but declares an invalid project
    Config(ConfigError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io { path, source } => {
                write!(f, "Failed to read '{}': {}", path, source)
            }
            ParseError::Yaml { source } => {
                write!(f, "Invalid YAML: {}", source)
            }
            ParseError::Config(err) => write!(f, "Invalid project: {}", err),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { source, .. } => Some(source),
            ParseError::Yaml { source } => Some(source),
            ParseError::Config(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        ParseError::Yaml { source: err }
    }
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Config(err)
    }
}

/// Any error raised by the crate
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Resolve(ResolveError),
    Validation(ValidationError),
    Storage(StorageError),
    Frame(FrameError),
    Parse(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => write!(f, "Configuration error: {}", err),
            Error::Resolve(err) => write!(f, "Resolution error: {}", err),
            Error::Validation(err) => write!(f, "Validation error: {}", err),
            Error::Storage(err) => write!(f, "Storage error: {}", err),
            Error::Frame(err) => write!(f, "Table error: {}", err),
            Error::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Resolve(err) => Some(err),
            Error::Validation(err) => Some(err),
            Error::Storage(err) => Some(err),
            Error::Frame(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Error::Resolve(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Error::Frame(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}
