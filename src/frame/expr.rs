//! Column expressions
//!
//! `CastExpr` is what a model column hands to the table to normalize one column.
//! `ColumnExpr` is the symbolic reference returned by `Model::column`.

use arrow::array::ArrayRef;
use arrow::datatypes::DataType as ArrowType;
use std::fmt;

use super::table::Table;

/// How one column must be converted to reach its declared type
#[derive(Debug, Clone, PartialEq)]
pub enum CastExpr {
    /// Column already has the right type
    Keep { column: String },
    /// Strict Arrow cast to the target type
    Cast { column: String, to: ArrowType },
    /// Parse Utf8 values into Date32 with a chrono format string
    ParseDate { column: String, format: String },
    /// Parse Utf8 values into microsecond timestamps with a chrono format string
    ParseDatetime { column: String, format: String },
}

impl CastExpr {
    /// Physical column the expression applies to
    pub fn column(&self) -> &str {
        match self {
            CastExpr::Keep { column }
            | CastExpr::Cast { column, .. }
            | CastExpr::ParseDate { column, .. }
            | CastExpr::ParseDatetime { column, .. } => column,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, CastExpr::Keep { .. })
    }
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastExpr::Keep { column } => write!(f, "col(\"{}\")", column),
            CastExpr::Cast { column, to } => write!(f, "col(\"{}\").cast({})", column, to),
            CastExpr::ParseDate { column, format } => {
                write!(f, "col(\"{}\").str.to_date(\"{}\")", column, format)
            }
            CastExpr::ParseDatetime { column, format } => {
                write!(f, "col(\"{}\").str.to_datetime(\"{}\")", column, format)
            }
        }
    }
}

/// Symbolic reference to a model column, used when working with a materialized table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpr {
    name: String,
}

impl ColumnExpr {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Physical column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The values of this column in a table, if present
    pub fn values<'a>(&self, table: &'a Table) -> Option<&'a ArrayRef> {
        table.column(&self.name)
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col(\"{}\")", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let keep = CastExpr::Keep { column: "col".to_string() };
        assert_eq!(keep.to_string(), "col(\"col\")");

        let cast = CastExpr::Cast { column: "col4".to_string(), to: ArrowType::UInt64 };
        assert_eq!(cast.to_string(), "col(\"col4\").cast(UInt64)");

        let parse = CastExpr::ParseDate { column: "col5".to_string(), format: "%Y".to_string() };
        assert_eq!(parse.to_string(), "col(\"col5\").str.to_date(\"%Y\")");
        assert_eq!(parse.column(), "col5");
        assert!(!parse.is_keep());
    }

    #[test]
    fn test_column_expr_display() {
        assert_eq!(ColumnExpr::new("author_id").to_string(), "col(\"author_id\")");
    }
}
