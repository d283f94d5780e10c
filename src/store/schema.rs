//! Table Schema Model
//!
//! The store's table schema document: dimension, metric, and date-time
//! field declarations. Deserialized from the controller's camelCase JSON
//! and treated as an immutable snapshot for the lifetime of one query.

use serde::{Deserialize, Serialize};

/// A dimension or metric field declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldSpec {
    /// Column name
    pub name: String,
    /// Declared physical type (INT, LONG, FLOAT, DOUBLE, STRING, ...)
    pub data_type: String,
}

/// A date-time field declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateTimeFieldSpec {
    /// Column name
    pub name: String,
    /// Declared physical type
    pub data_type: String,
    /// Declared time format expression (for example `1:MILLISECONDS:EPOCH`)
    pub format: String,
    /// Declared storage granularity (for example `1:MILLISECONDS`)
    pub granularity: String,
}

/// A table schema snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSchema {
    /// Schema (table) name
    pub schema_name: String,
    /// Dimension columns
    pub dimension_field_specs: Vec<FieldSpec>,
    /// Metric columns
    pub metric_field_specs: Vec<FieldSpec>,
    /// Date-time columns
    pub date_time_field_specs: Vec<DateTimeFieldSpec>,
}

impl TableSchema {
    /// Look up a date-time field by column name
    pub fn date_time_field(&self, name: &str) -> Option<&DateTimeFieldSpec> {
        self.date_time_field_specs.iter().find(|f| f.name == name)
    }

    /// The table's primary time column, by convention the first declared
    pub fn primary_time_column(&self) -> Option<&DateTimeFieldSpec> {
        self.date_time_field_specs.first()
    }

    /// All column names in declaration order: dimensions, metrics, date-times
    pub fn column_names(&self) -> Vec<&str> {
        self.dimension_field_specs
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.metric_field_specs.iter().map(|f| f.name.as_str()))
            .chain(self.date_time_field_specs.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Whether the schema declares a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|n| *n == name)
    }
}
