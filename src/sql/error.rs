//! SQL compiler error types

use thiserror::Error;

/// Errors produced while compiling a query description into SQL
///
/// Every variant is fatal to the affected query only; nothing here aborts
/// sibling queries in a batch.
#[derive(Error, Debug)]
pub enum SqlError {
    /// A required field is missing or invalid at driver construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A declared time-column format was not recognized
    #[error("Unsupported time format: {0}")]
    UnsupportedFormat(String),

    /// The time column is not declared in the table schema
    #[error("Column not found in schema: {0}")]
    ColumnNotFound(String),

    /// A macro was invoked with the wrong number of arguments
    #[error("Macro {name} expects {expected} argument(s), got {found}")]
    MacroArity {
        /// Macro name including the `$__` prefix
        name: String,
        /// Arguments the macro takes
        expected: usize,
        /// Arguments the invocation supplied
        found: usize,
    },

    /// A macro argument list was opened but never closed
    #[error("Macro {name}: unterminated argument list")]
    MacroUnterminated {
        /// Macro name including the `$__` prefix
        name: String,
    },

    /// A macro expansion failed for an inner reason
    #[error("Macro {name}: {source}")]
    Macro {
        /// Macro name including the `$__` prefix
        name: String,
        /// The underlying failure
        source: Box<SqlError>,
    },
}

impl SqlError {
    /// Wrap an error with the macro name it occurred in
    pub fn in_macro(self, name: impl Into<String>) -> Self {
        Self::Macro {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for SQL compilation operations
pub type SqlResult<T> = Result<T, SqlError>;
