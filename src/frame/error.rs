//! Frame extraction errors

use thiserror::Error;

/// Errors raised while turning a result table into a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The result table has no column with the requested name
    #[error("Column not found in results: {0}")]
    ColumnNotFound(String),

    /// A time cell could not be parsed in the column's declared format
    #[error("Cannot parse time value '{value}' in column {column}")]
    TimeParse { column: String, value: String },
}

/// Result type for frame extraction
pub type ExtractResult<T> = Result<T, ExtractError>;
