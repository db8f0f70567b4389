//! File formats understood by storages

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Serialization format of a table in a file-based storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Newline-delimited JSON
    Json,
    Csv,
    Parquet,
    Excel,
    Avro,
}

impl FileFormat {
    /// Every known format
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Json,
        FileFormat::Csv,
        FileFormat::Parquet,
        FileFormat::Excel,
        FileFormat::Avro,
    ];

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Excel => "xlsx",
            FileFormat::Avro => "avro",
        }
    }

    /// Whether values are stored as text, so dates need a string form
    pub fn is_text(&self) -> bool {
        matches!(self, FileFormat::Json | FileFormat::Csv)
    }

    /// Split a table name such as `orders.json` into its base name and suffix
    pub fn split_suffix(table_name: &str) -> Option<(&str, &str)> {
        table_name
            .rsplit_once('.')
            .filter(|(base, suffix)| !base.is_empty() && !suffix.is_empty())
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Excel => "excel",
            FileFormat::Avro => "avro",
        };
        f.write_str(name)
    }
}

/// Error when a string names no known format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown file format '{}'", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for FileFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "json" | "jsonl" | "ndjson" => Ok(FileFormat::Json),
            "csv" => Ok(FileFormat::Csv),
            "parquet" | "pq" => Ok(FileFormat::Parquet),
            "excel" | "xlsx" | "xls" => Ok(FileFormat::Excel),
            "avro" => Ok(FileFormat::Avro),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for FileFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileFormat::from_str(&s).map_err(serde::de::Error::custom)
    }
}
