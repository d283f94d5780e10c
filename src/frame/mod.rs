//! Trellis Data Frames
//!
//! Columnar output assembly for query results:
//!
//! - **Frame / Field**: the columnar result the API serializes
//! - **Extract**: typed column extraction from a store result table
//! - **Pivot**: long-to-wide reshaping for time-series display
//!
//! # Examples
//!
//! ```rust,ignore
//! use trellis::frame::{pivot, Frame, TimeSeriesMetric};
//!
//! // Wide frame from long-form observations
//! let frame = pivot("metric", "time", &observations);
//! for field in &frame.fields {
//!     println!("{}: {} points", field.name, field.values.len());
//! }
//! ```

use chrono::{DateTime, Utc};

mod error;
mod extract;
mod pivot;

pub use error::{ExtractError, ExtractResult};
pub use extract::{
    column_index, extract_column, extract_literal_exprs, extract_series_frame,
    extract_table_frame, extract_time_column,
};
pub use pivot::{pivot, TimeSeriesMetric};

/// A typed column of values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    /// 64-bit integers
    Long(Vec<i64>),
    /// 64-bit floats
    Double(Vec<f64>),
    /// UTF-8 strings
    String(Vec<String>),
    /// UTC instants
    Time(Vec<DateTime<Utc>>),
    /// Floats with gaps, used by pivoted series
    NullableDouble(Vec<Option<f64>>),
}

impl FieldValues {
    /// Number of values in the column
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Long(v) => v.len(),
            FieldValues::Double(v) => v.len(),
            FieldValues::String(v) => v.len(),
            FieldValues::Time(v) => v.len(),
            FieldValues::NullableDouble(v) => v.len(),
        }
    }

    /// Whether the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name as displayed
    pub name: String,
    /// Column values
    pub values: FieldValues,
}

impl Field {
    /// Create a field from a name and values
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A named collection of equal-length fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Frame name, usually the response ref id or metric name
    pub name: String,
    /// Fields in display order
    pub fields: Vec<Field>,
}

impl Frame {
    /// Create an empty frame
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Number of rows, taken from the first field
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, |f| f.values.len())
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
