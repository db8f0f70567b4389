//! Column definitions
//!
//! A `Column` is one typed slot of a model. Its `ColumnKind` decides the default Arrow type,
//! the set of types it can be cast to and the custom conversions (string parsing for
//! dates and datetimes) applied when reading untyped data.

use arrow::datatypes::{DataType as ArrowType, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ValidationError};
use crate::frame::CastExpr;
use super::types::DataType;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const INTEGER_TYPES: [ArrowType; 8] = [
    ArrowType::UInt8,
    ArrowType::UInt16,
    ArrowType::UInt32,
    ArrowType::UInt64,
    ArrowType::Int8,
    ArrowType::Int16,
    ArrowType::Int32,
    ArrowType::Int64,
];

/// Class of a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Untyped; never cast to anything but its own type
    Any,
    Boolean,
    String,
    Integer,
    Float,
    /// Calendar date, parsed from strings with a chrono format
    Date { format: String },
    /// Timestamp, parsed from strings with a chrono format
    DateTime { format: String },
}

impl ColumnKind {
    pub fn date() -> Self {
        ColumnKind::Date { format: DEFAULT_DATE_FORMAT.to_string() }
    }

    pub fn datetime() -> Self {
        ColumnKind::DateTime { format: DEFAULT_DATETIME_FORMAT.to_string() }
    }

    /// Kind that naturally holds a declared type
    pub fn for_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Bool => ColumnKind::Boolean,
            DataType::String => ColumnKind::String,
            DataType::F32 | DataType::F64 | DataType::Decimal { .. } => ColumnKind::Float,
            DataType::Date => ColumnKind::date(),
            DataType::Timestamp => ColumnKind::datetime(),
            dtype if dtype.is_integer() => ColumnKind::Integer,
            _ => ColumnKind::Any,
        }
    }

    /// Type a column of this kind holds when no dtype is declared
    pub fn default_type(&self) -> ArrowType {
        match self {
            ColumnKind::Any | ColumnKind::String => ArrowType::Utf8,
            ColumnKind::Boolean => ArrowType::Boolean,
            ColumnKind::Integer => ArrowType::Int32,
            ColumnKind::Float => ArrowType::Float32,
            ColumnKind::Date { .. } => ArrowType::Date32,
            ColumnKind::DateTime { .. } => ArrowType::Timestamp(TimeUnit::Microsecond, None),
        }
    }

    /// Whether values can be cast to `dtype`
    pub fn supports(&self, dtype: &ArrowType) -> bool {
        match self {
            ColumnKind::Any => false,
            ColumnKind::Boolean => dtype == &ArrowType::Boolean,
            ColumnKind::String => dtype == &ArrowType::Utf8,
            ColumnKind::Integer => INTEGER_TYPES.contains(dtype),
            ColumnKind::Float => matches!(
                dtype,
                ArrowType::Float32 | ArrowType::Float64 | ArrowType::Decimal128(_, _)
            ),
            ColumnKind::Date { .. } => dtype == &ArrowType::Date32,
            ColumnKind::DateTime { .. } => matches!(dtype, ArrowType::Timestamp(_, _)),
        }
    }

    /// Representative list of supported types, for error messages
    pub fn supported_types(&self) -> Vec<ArrowType> {
        match self {
            ColumnKind::Any => Vec::new(),
            ColumnKind::Boolean => vec![ArrowType::Boolean],
            ColumnKind::String => vec![ArrowType::Utf8],
            ColumnKind::Integer => INTEGER_TYPES.to_vec(),
            ColumnKind::Float => vec![
                ArrowType::Float32,
                ArrowType::Float64,
                ArrowType::Decimal128(38, 10),
            ],
            ColumnKind::Date { .. } => vec![ArrowType::Date32],
            ColumnKind::DateTime { .. } => vec![ArrowType::Timestamp(TimeUnit::Microsecond, None)],
        }
    }

    /// Conversion used instead of a plain cast for untyped input
    fn custom_rule(&self, column: &str, current: &ArrowType) -> Option<CastExpr> {
        match (self, current) {
            (ColumnKind::Date { format }, ArrowType::Utf8) => Some(CastExpr::ParseDate {
                column: column.to_string(),
                format: format.clone(),
            }),
            (ColumnKind::DateTime { format }, ArrowType::Utf8) => Some(CastExpr::ParseDatetime {
                column: column.to_string(),
                format: format.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Any => write!(f, "any"),
            ColumnKind::Boolean => write!(f, "boolean"),
            ColumnKind::String => write!(f, "string"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Date { .. } => write!(f, "date"),
            ColumnKind::DateTime { .. } => write!(f, "datetime"),
        }
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(ColumnKind::Any),
            "boolean" | "bool" => Ok(ColumnKind::Boolean),
            "string" | "str" | "text" => Ok(ColumnKind::String),
            "integer" | "int" => Ok(ColumnKind::Integer),
            "float" | "decimal" => Ok(ColumnKind::Float),
            "date" => Ok(ColumnKind::date()),
            "datetime" | "timestamp" => Ok(ColumnKind::datetime()),
            _ => Err(format!("Unknown column kind '{}'", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ColumnKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A column declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub kind: ColumnKind,
    /// Physical name override
    pub column_name: Option<String>,
    /// Cast the column to its target type on every read
    pub enforce_dtype: bool,
    /// Explicit target type; the kind's default otherwise
    pub dtype: Option<DataType>,
    /// Part of the deduplication key
    pub unique: bool,
    declared_name: Option<String>,
}

impl Column {
    pub fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            column_name: None,
            enforce_dtype: true,
            dtype: None,
            unique: false,
            declared_name: None,
        }
    }

    pub fn any() -> Self {
        Self::new(ColumnKind::Any)
    }

    pub fn boolean() -> Self {
        Self::new(ColumnKind::Boolean)
    }

    pub fn string() -> Self {
        Self::new(ColumnKind::String)
    }

    pub fn integer() -> Self {
        Self::new(ColumnKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(ColumnKind::Float)
    }

    pub fn date() -> Self {
        Self::new(ColumnKind::date())
    }

    pub fn datetime() -> Self {
        Self::new(ColumnKind::datetime())
    }

    /// Builder: read and write the column under another physical name
    pub fn with_column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    /// Builder: explicit target type
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Builder: make the column part of the deduplication key
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Builder: whether the column is cast on read
    pub fn enforce_dtype(mut self, enforce: bool) -> Self {
        self.enforce_dtype = enforce;
        self
    }

    /// Builder: parse format for date and datetime columns; ignored by other kinds
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        match &mut self.kind {
            ColumnKind::Date { format: current } | ColumnKind::DateTime { format: current } => {
                *current = format.into();
            }
            _ => {}
        }
        self
    }

    /// Bind the declared name; a column is bound exactly once
    pub fn bind(&mut self, name: &str) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyColumnName);
        }
        if let Some(bound) = &self.declared_name {
            return Err(ConfigError::ColumnAlreadyBound {
                name: bound.clone(),
                attempted: name.to_string(),
            });
        }
        self.declared_name = Some(name.to_string());
        Ok(())
    }

    /// Name the column was declared under, once bound
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.declared_name.is_some()
    }

    /// Name used in tables: the override if set, else the declared name
    pub fn physical_name(&self) -> &str {
        self.column_name
            .as_deref()
            .or(self.declared_name.as_deref())
            .unwrap_or_default()
    }

    /// Type the column is cast to
    pub fn target_type(&self) -> ArrowType {
        self.dtype
            .map(|dtype| dtype.to_arrow())
            .unwrap_or_else(|| self.kind.default_type())
    }

    /// Chrono format values are written with in text formats
    ///
    /// Only enforced date and datetime columns without a dtype have one: those are the
    /// columns parsed back with the same format on read.
    pub fn text_format(&self) -> Option<&str> {
        if !self.enforce_dtype || self.dtype.is_some() {
            return None;
        }
        match &self.kind {
            ColumnKind::Date { format } | ColumnKind::DateTime { format } => Some(format),
            _ => None,
        }
    }

    /// Expression bringing a column currently typed `current` to the target type
    pub fn cast_expression(&self, current: &ArrowType) -> Result<CastExpr, ValidationError> {
        let column = self.physical_name();
        let target = self.target_type();
        let default = self.kind.default_type();

        if &target == current && current != &default {
            return Err(ValidationError::DtypeMismatch {
                column: column.to_string(),
                dtype: current.clone(),
                default,
            });
        }

        if &target == current {
            return Ok(CastExpr::Keep { column: column.to_string() });
        }

        if !self.kind.supports(&target) {
            return Err(ValidationError::UnsupportedDtype {
                column: column.to_string(),
                dtype: target,
                supported: self.kind.supported_types(),
            });
        }

        if self.dtype.is_none() {
            if let Some(rule) = self.kind.custom_rule(column, current) {
                return Ok(rule);
            }
        }

        Ok(CastExpr::Cast {
            column: column.to_string(),
            to: target,
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}, dtype={}>", self.kind, self.physical_name(), self.target_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(mut column: Column, name: &str) -> Column {
        column.bind(name).unwrap();
        column
    }

    #[test]
    fn test_physical_name() {
        let column = bound(Column::string(), "col");
        assert_eq!(column.physical_name(), "col");

        let column = bound(Column::string().with_column_name("myname"), "col");
        assert_eq!(column.physical_name(), "myname");
        assert_eq!(column.declared_name(), Some("col"));
    }

    #[test]
    fn test_bind_once() {
        let mut column = Column::integer();
        assert_eq!(column.bind(""), Err(ConfigError::EmptyColumnName));
        column.bind("a").unwrap();
        assert!(matches!(column.bind("b"), Err(ConfigError::ColumnAlreadyBound { .. })));
    }

    #[test]
    fn test_same_type_as_default_is_kept() {
        let column = bound(Column::string(), "col");
        assert_eq!(
            column.cast_expression(&ArrowType::Utf8).unwrap(),
            CastExpr::Keep { column: "col".to_string() }
        );
    }

    #[test]
    fn test_explicit_dtype_already_present_is_mismatch() {
        let column = bound(Column::integer().with_dtype(DataType::I64), "col");
        let result = column.cast_expression(&ArrowType::Int64);
        assert!(matches!(result, Err(ValidationError::DtypeMismatch { .. })));
    }

    #[test]
    fn test_unsupported_dtype() {
        let column = bound(Column::integer().with_dtype(DataType::F64), "col");
        let result = column.cast_expression(&ArrowType::Int64);
        assert!(matches!(result, Err(ValidationError::UnsupportedDtype { .. })));

        let column = bound(Column::any(), "col");
        assert!(column.cast_expression(&ArrowType::Utf8).unwrap().is_keep());
        assert!(column.cast_expression(&ArrowType::Int64).is_err());
    }

    #[test]
    fn test_custom_rule_only_without_dtype() {
        let column = bound(Column::date().with_format("%d/%m/%Y"), "born");
        assert_eq!(
            column.cast_expression(&ArrowType::Utf8).unwrap(),
            CastExpr::ParseDate { column: "born".to_string(), format: "%d/%m/%Y".to_string() }
        );

        let column = bound(Column::datetime(), "at");
        assert!(matches!(
            column.cast_expression(&ArrowType::Utf8).unwrap(),
            CastExpr::ParseDatetime { format, .. } if format == DEFAULT_DATETIME_FORMAT
        ));

        let column = bound(Column::date().with_dtype(DataType::Date), "born");
        assert_eq!(
            column.cast_expression(&ArrowType::Utf8).unwrap(),
            CastExpr::Cast { column: "born".to_string(), to: ArrowType::Date32 }
        );
    }

    #[test]
    fn test_generic_cast() {
        let column = bound(Column::integer().with_dtype(DataType::U64), "col4");
        assert_eq!(
            column.cast_expression(&ArrowType::Int64).unwrap().to_string(),
            "col(\"col4\").cast(UInt64)"
        );

        let column = bound(Column::float(), "price");
        assert_eq!(
            column.cast_expression(&ArrowType::Float64).unwrap(),
            CastExpr::Cast { column: "price".to_string(), to: ArrowType::Float32 }
        );
    }

    #[test]
    fn test_kind_from_str_and_dtype() {
        assert_eq!("Integer".parse::<ColumnKind>().unwrap(), ColumnKind::Integer);
        assert_eq!("date".parse::<ColumnKind>().unwrap(), ColumnKind::date());
        assert!("uuid".parse::<ColumnKind>().is_err());

        assert_eq!(ColumnKind::for_dtype(&DataType::U16), ColumnKind::Integer);
        assert_eq!(ColumnKind::for_dtype(&DataType::Decimal { precision: 10, scale: 2 }), ColumnKind::Float);
        assert_eq!(ColumnKind::for_dtype(&DataType::Timestamp), ColumnKind::datetime());
    }
}
