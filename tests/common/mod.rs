//! Shared test utilities for integration tests

#![allow(dead_code)]

use arrow::util::display::array_value_to_string;
use datasaurus::{parser, Catalog, Column, Meta, Model, ModelDeclaration, Table};
use std::collections::HashMap;
use std::sync::Arc;

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Catalog {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// `Author(id: integer, name: string, score: float)` with the given Meta
pub fn author_model(meta: Meta) -> Arc<Model> {
    Model::new(
        ModelDeclaration::new("Author")
            .column("id", Column::integer())
            .column("name", Column::string())
            .column("score", Column::float())
            .meta(meta),
    )
    .unwrap_or_else(|e| panic!("Failed to declare Author: {}", e))
}

/// Environment variables for resolution, without touching the process environment
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

// =============================================================================
// Table Inspection Utilities
// =============================================================================

/// Display values of a column, nulls as empty strings
pub fn column_strings(table: &Table, name: &str) -> Vec<String> {
    let array = table
        .column(name)
        .unwrap_or_else(|| panic!("Column '{}' not in {:?}", name, table.column_names()));
    (0..array.len())
        .map(|row| array_value_to_string(array, row).unwrap())
        .collect()
}

/// Arrow type of a column
pub fn column_type(table: &Table, name: &str) -> arrow::datatypes::DataType {
    table
        .schema_types()
        .remove(name)
        .unwrap_or_else(|| panic!("Column '{}' not in {:?}", name, table.column_names()))
}
