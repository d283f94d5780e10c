//! Store client error types

use thiserror::Error;

/// Errors that can occur when communicating with the analytics store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The request timed out
    #[error("Store request timeout")]
    Timeout,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("Store error {status}: {body}")]
    Response {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The store accepted the request but reported query exceptions
    #[error("Query failed: {0}")]
    Execution(String),

    /// The store's response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// No schema is registered for the table
    #[error("Schema not found for table: {0}")]
    SchemaNotFound(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
