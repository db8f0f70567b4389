//! Declared data types for model columns
//!
//! `DataType` is the vocabulary a column's `dtype` is written in, in code or YAML. Every
//! variant maps onto exactly one Arrow type.

use arrow::datatypes::{DataType as ArrowType, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    String,
    /// Calendar date, stored as days
    Date,
    /// Naive timestamp with microsecond precision
    Timestamp,
    /// 128-bit decimal
    Decimal { precision: u8, scale: u8 },
}

/// Spellings accepted for the fixed-width types; the first one is canonical
const NAMES: [(&[&str], DataType); 14] = [
    (&["i8", "tinyint"], DataType::I8),
    (&["i16", "smallint"], DataType::I16),
    (&["i32", "int", "integer"], DataType::I32),
    (&["i64", "long", "bigint"], DataType::I64),
    (&["u8"], DataType::U8),
    (&["u16"], DataType::U16),
    (&["u32"], DataType::U32),
    (&["u64"], DataType::U64),
    (&["f32", "float", "real"], DataType::F32),
    (&["f64", "double"], DataType::F64),
    (&["bool", "boolean"], DataType::Bool),
    (&["string", "str", "text", "utf8"], DataType::String),
    (&["date"], DataType::Date),
    (&["timestamp", "datetime"], DataType::Timestamp),
];

/// Largest precision an Arrow `Decimal128` holds
const MAX_DECIMAL_PRECISION: u8 = 38;

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let DataType::Decimal { precision, scale } = self {
            return write!(f, "decimal({}, {})", precision, scale);
        }
        let name = NAMES
            .iter()
            .find(|(_, dtype)| dtype == self)
            .map(|(names, _)| names[0])
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

/// A dtype string that names no `DataType`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDataTypeError {
    pub input: String,
    pub reason: &'static str,
}

impl ParseDataTypeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ParseDataTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot read dtype '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseDataTypeError {}

impl FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();

        if let Some(args) = normalized
            .strip_prefix("decimal(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let (precision, scale) = args
                .split_once(',')
                .ok_or_else(|| ParseDataTypeError::new(s, "expected decimal(precision, scale)"))?;
            let precision: u8 = precision
                .trim()
                .parse()
                .map_err(|_| ParseDataTypeError::new(s, "precision is not a number"))?;
            let scale: u8 = scale
                .trim()
                .parse()
                .map_err(|_| ParseDataTypeError::new(s, "scale is not a number"))?;
            if !(1..=MAX_DECIMAL_PRECISION).contains(&precision) {
                return Err(ParseDataTypeError::new(s, "precision must be within 1..=38"));
            }
            if scale > precision {
                return Err(ParseDataTypeError::new(s, "scale is larger than precision"));
            }
            return Ok(DataType::Decimal { precision, scale });
        }

        NAMES
            .iter()
            .find(|(names, _)| names.contains(&normalized.as_str()))
            .map(|(_, dtype)| *dtype)
            .ok_or_else(|| ParseDataTypeError::new(s, "not a known dtype"))
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl DataType {
    /// The Arrow type tables hold for this declared type
    pub fn to_arrow(&self) -> ArrowType {
        match *self {
            DataType::I8 => ArrowType::Int8,
            DataType::I16 => ArrowType::Int16,
            DataType::I32 => ArrowType::Int32,
            DataType::I64 => ArrowType::Int64,
            DataType::U8 => ArrowType::UInt8,
            DataType::U16 => ArrowType::UInt16,
            DataType::U32 => ArrowType::UInt32,
            DataType::U64 => ArrowType::UInt64,
            DataType::F32 => ArrowType::Float32,
            DataType::F64 => ArrowType::Float64,
            DataType::Bool => ArrowType::Boolean,
            DataType::String => ArrowType::Utf8,
            DataType::Date => ArrowType::Date32,
            DataType::Timestamp => ArrowType::Timestamp(TimeUnit::Microsecond, None),
            DataType::Decimal { precision, scale } => ArrowType::Decimal128(precision, scale as i8),
        }
    }

    pub fn is_integer(&self) -> bool {
        self.to_arrow().is_integer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!("i32".parse::<DataType>().unwrap(), DataType::I32);
        assert_eq!(" BigInt ".parse::<DataType>().unwrap(), DataType::I64);
        assert_eq!("U64".parse::<DataType>().unwrap(), DataType::U64);
        assert_eq!("utf8".parse::<DataType>().unwrap(), DataType::String);
        assert_eq!("datetime".parse::<DataType>().unwrap(), DataType::Timestamp);
        assert_eq!("list<i32>".parse::<DataType>().unwrap_err().reason, "not a known dtype");
    }

    #[test]
    fn test_decimal_bounds() {
        assert_eq!(
            "Decimal(10,2)".parse::<DataType>().unwrap(),
            DataType::Decimal { precision: 10, scale: 2 }
        );
        assert!("decimal(0, 0)".parse::<DataType>().is_err());
        assert!("decimal(39, 2)".parse::<DataType>().is_err());
        assert!("decimal(5, 10)".parse::<DataType>().is_err());
        assert!("decimal(10)".parse::<DataType>().is_err());
    }

    #[test]
    fn test_display_is_canonical_name() {
        assert_eq!(DataType::F32.to_string(), "f32");
        assert_eq!(DataType::Decimal { precision: 12, scale: 3 }.to_string(), "decimal(12, 3)");
        assert_eq!("double".parse::<DataType>().unwrap().to_string(), "f64");
    }

    #[test]
    fn test_arrow_mapping() {
        assert_eq!(DataType::U8.to_arrow(), ArrowType::UInt8);
        assert_eq!(
            DataType::Timestamp.to_arrow(),
            ArrowType::Timestamp(TimeUnit::Microsecond, None)
        );
        assert_eq!(
            DataType::Decimal { precision: 18, scale: 4 }.to_arrow(),
            ArrowType::Decimal128(18, 4)
        );
        assert!(DataType::U32.is_integer());
        assert!(!DataType::F32.is_integer());
    }

    #[test]
    fn test_dtype_from_yaml() {
        let parsed: Vec<DataType> = serde_yaml::from_str("[i16, 'decimal(12, 3)', text]").unwrap();
        assert_eq!(
            parsed,
            vec![
                DataType::I16,
                DataType::Decimal { precision: 12, scale: 3 },
                DataType::String,
            ]
        );
    }
}
