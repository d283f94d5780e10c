//! Store Result Wire Model
//!
//! The broker's tabular query response: a column schema (names plus declared
//! physical types) and row-major JSON cells, with typed per-cell getters
//! that apply the store's loose numeric coercions in one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of physical column types the extractor dispatches on
///
/// Anything outside the set parses as [`DataType::Other`]; downstream
/// handling degrades rather than fails on those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// UTF-8 string
    String,
    /// Any type outside the closed set
    Other,
}

impl DataType {
    /// Parse a declared type name (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "INT" => Self::Int,
            "LONG" => Self::Long,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "STRING" => Self::String,
            _ => Self::Other,
        }
    }

    /// Whether the type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Long | Self::Float | Self::Double)
    }
}

/// Column names and declared types for a result table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSchema {
    /// Column names, in result order
    pub column_names: Vec<String>,
    /// Declared physical type per column
    pub column_data_types: Vec<String>,
}

/// A tabular query result as returned by the store broker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultTable {
    /// Column schema
    pub data_schema: DataSchema,
    /// Row-major cells
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.data_schema.column_names.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column name at an index
    pub fn column_name(&self, idx: usize) -> Option<&str> {
        self.data_schema.column_names.get(idx).map(String::as_str)
    }

    /// Declared column type at an index
    pub fn column_type(&self, idx: usize) -> DataType {
        self.data_schema
            .column_data_types
            .get(idx)
            .map(|s| DataType::parse(s))
            .unwrap_or(DataType::Other)
    }

    /// Raw declared type name at an index
    pub fn column_type_name(&self, idx: usize) -> &str {
        self.data_schema
            .column_data_types
            .get(idx)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Raw cell value
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row)?.get(col)
    }

    /// Cell as a 64-bit integer
    ///
    /// Accepts JSON integers, fractionless reading of JSON floats, and
    /// numeric strings.
    pub fn long_value(&self, row: usize, col: usize) -> Option<i64> {
        match self.cell(row, col)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Cell as a 64-bit float
    pub fn double_value(&self, row: usize, col: usize) -> Option<f64> {
        match self.cell(row, col)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Cell as a string
    ///
    /// Strings come back as-is; numbers and booleans render in their JSON
    /// form, which is how label values are compared upstream.
    pub fn string_value(&self, row: usize, col: usize) -> Option<String> {
        match self.cell(row, col)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// One store-side query exception
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrokerException {
    /// Store error code
    pub error_code: i64,
    /// Human-readable message
    pub message: String,
}

/// The broker's full query response envelope
///
/// A response can carry exceptions without a result table, a result table
/// without exceptions, or neither (an empty result).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrokerResponse {
    /// The tabular result, when the query produced one
    pub result_table: Option<ResultTable>,
    /// Store-side exceptions, when the query failed or degraded
    pub exceptions: Vec<BrokerException>,
}
