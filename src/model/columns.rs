//! Ordered column collections

use arrow::datatypes::DataType as ArrowType;
use std::collections::HashMap;
use std::ops::Index;

use crate::error::{ConfigError, ValidationError};
use crate::frame::{CastExpr, Table};
use super::column::{Column, ColumnKind};

/// Attribute filter for `Columns::names_by_attributes`
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAttr {
    Unique(bool),
    EnforceDtype(bool),
    Kind(ColumnKind),
}

impl ColumnAttr {
    fn matches(&self, column: &Column) -> bool {
        match self {
            ColumnAttr::Unique(unique) => column.unique == *unique,
            ColumnAttr::EnforceDtype(enforce) => column.enforce_dtype == *enforce,
            // Kinds compare by class; date and datetime formats are ignored
            ColumnAttr::Kind(kind) => std::mem::discriminant(&column.kind) == std::mem::discriminant(kind),
        }
    }
}

/// The columns of one model, unique by declared name, in composition order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a column to its declared name and append it
    pub fn push(&mut self, name: &str, mut column: Column) -> Result<(), ConfigError> {
        column.bind(name)?;
        self.insert(column)
    }

    /// Append an already bound column
    pub fn insert(&mut self, column: Column) -> Result<(), ConfigError> {
        let name = column.declared_name().ok_or(ConfigError::UnboundColumn)?;
        if self.contains(name) {
            return Err(ConfigError::ColumnCollision { column: name.to_string() });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Append every column of `other` after our own
    pub fn extend(&mut self, other: &Columns) -> Result<(), ConfigError> {
        for column in other {
            self.insert(column.clone())?;
        }
        Ok(())
    }

    /// Column by declared name
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.declared_name() == Some(name))
    }

    /// Whether a column with this declared name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn declared_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| c.declared_name().map(str::to_string))
            .collect()
    }

    /// Names used in tables, in order
    pub fn physical_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.physical_name().to_string()).collect()
    }

    /// Physical names of columns matching every attribute
    ///
    /// ```ignore
    /// let keys = columns.names_by_attributes(&[ColumnAttr::Unique(true)]);
    /// ```
    pub fn names_by_attributes(&self, attrs: &[ColumnAttr]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| attrs.iter().all(|attr| attr.matches(column)))
            .map(|column| column.physical_name().to_string())
            .collect()
    }

    /// Cast expressions for enforced columns, given the types observed in a table
    ///
    /// Columns absent from `current_types` are skipped.
    pub fn cast_expressions(
        &self,
        current_types: &HashMap<String, ArrowType>,
    ) -> Result<Vec<CastExpr>, ValidationError> {
        self.columns
            .iter()
            .filter(|column| column.enforce_dtype)
            .filter_map(|column| {
                current_types
                    .get(column.physical_name())
                    .map(|current| column.cast_expression(current))
            })
            .collect()
    }

    /// Whether a table carries every physical column, optionally with castable types
    pub fn is_compatible_with(&self, table: &Table, check_dtypes: bool) -> bool {
        let types = table.schema_types();
        if !self.columns.iter().all(|c| types.contains_key(c.physical_name())) {
            return false;
        }
        !check_dtypes || self.cast_expressions(&types).is_ok()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }
}

impl Index<usize> for Columns {
    type Output = Column;

    fn index(&self, index: usize) -> &Column {
        &self.columns[index]
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    fn author_columns() -> Columns {
        let mut columns = Columns::new();
        columns.push("id", Column::integer().unique()).unwrap();
        columns.push("name", Column::string().with_column_name("full_name")).unwrap();
        columns.push("mail", Column::string().unique().enforce_dtype(false)).unwrap();
        columns
    }

    #[test]
    fn test_order_and_names() {
        let columns = author_columns();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns.declared_names(), vec!["id", "name", "mail"]);
        assert_eq!(columns.physical_names(), vec!["id", "full_name", "mail"]);
        assert_eq!(columns[1].physical_name(), "full_name");
        assert!(columns.contains("name"));
        assert!(!columns.contains("full_name"));
    }

    #[test]
    fn test_extend_appends_and_rejects_collisions() {
        let mut child = Columns::new();
        child.push("joined", Column::date()).unwrap();
        child.extend(&author_columns()).unwrap();
        assert_eq!(child.declared_names(), vec!["joined", "id", "name", "mail"]);

        let mut clash = Columns::new();
        clash.push("id", Column::string()).unwrap();
        assert_eq!(
            clash.extend(&author_columns()),
            Err(ConfigError::ColumnCollision { column: "id".to_string() })
        );
    }

    #[test]
    fn test_insert_requires_binding() {
        let mut columns = Columns::new();
        assert_eq!(columns.insert(Column::string()), Err(ConfigError::UnboundColumn));
    }

    #[test]
    fn test_names_by_attributes() {
        let columns = author_columns();
        assert_eq!(columns.names_by_attributes(&[ColumnAttr::Unique(true)]), vec!["id", "mail"]);
        assert_eq!(
            columns.names_by_attributes(&[ColumnAttr::Unique(true), ColumnAttr::EnforceDtype(true)]),
            vec!["id"]
        );
        assert_eq!(
            columns.names_by_attributes(&[ColumnAttr::Kind(ColumnKind::String)]),
            vec!["full_name", "mail"]
        );
    }

    #[test]
    fn test_cast_expressions_skip_unenforced() {
        let columns = author_columns();
        let types: HashMap<String, ArrowType> = [
            ("id".to_string(), ArrowType::Int64),
            ("full_name".to_string(), ArrowType::Utf8),
            ("mail".to_string(), ArrowType::Int64),
        ]
        .into_iter()
        .collect();

        let exprs = columns.cast_expressions(&types).unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0], CastExpr::Cast { column: "id".to_string(), to: ArrowType::Int32 });
        assert!(exprs[1].is_keep());
    }

    #[test]
    fn test_is_compatible_with() {
        let columns = author_columns();
        let table = Table::from_columns(vec![
            ("id", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
            ("full_name", Arc::new(StringArray::from(vec!["a"])) as ArrayRef),
            ("mail", Arc::new(StringArray::from(vec!["a@b"])) as ArrayRef),
        ])
        .unwrap();
        assert!(columns.is_compatible_with(&table, true));

        let partial = table.select(&["id"]).unwrap();
        assert!(!columns.is_compatible_with(&partial, false));

        let mut explicit = Columns::new();
        explicit.push("id", Column::integer().with_dtype(DataType::I64)).unwrap();
        assert!(explicit.is_compatible_with(&table, false));
        assert!(!explicit.is_compatible_with(&table, true));
    }
}
