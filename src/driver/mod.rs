//! Trellis Query Drivers
//!
//! One query description becomes exactly one driver:
//!
//! - **NoOp**: incomplete or non-SQL queries; keeps the editor non-blocking
//! - **Builder**: structured editor fields compiled through the templates
//! - **Code**: raw SQL with macros run through the macro engine
//!
//! Selection is a pure function of the query description. Validation and
//! format resolution happen once at construction; a constructed driver
//! renders and extracts without further checks.
//!
//! # Examples
//!
//! ```rust,ignore
//! use trellis::driver::Driver;
//!
//! let driver = Driver::from_request(&query, &ctx, Some(&schema))?;
//! let sql = driver.render_sql()?;
//! let table = backend.execute_sql(&query.table, &sql).await?;
//! let frame = driver.extract_results(&table)?;
//! ```

use crate::frame::{ExtractResult, Frame};
use crate::request::{EditorMode, QueryContext, QueryRequest, QueryType};
use crate::sql::{SqlError, SqlResult};
use crate::store::{ResultTable, TableSchema};

mod builder;
mod code;

pub use builder::BuilderDriver;
pub use code::CodeDriver;

/// SQL rendered by the no-op driver
const NOOP_SQL: &str = "SELECT 1";

/// Which driver variant a query description selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// Nothing to execute
    NoOp,
    /// Structured builder query
    Builder,
    /// Raw SQL with macros
    Code,
}

impl DriverKind {
    /// Apply the selection rules to a query description
    ///
    /// Non-SQL query types, queries with no table chosen, and code queries
    /// with no code all select [`DriverKind::NoOp`].
    pub fn select(query: &QueryRequest) -> Self {
        if query.query_type != QueryType::Sql {
            return Self::NoOp;
        }
        if query.table.trim().is_empty() {
            return Self::NoOp;
        }
        match query.editor_mode {
            EditorMode::Builder => Self::Builder,
            EditorMode::Code => {
                if query.code.trim().is_empty() {
                    Self::NoOp
                } else {
                    Self::Code
                }
            }
        }
    }
}

/// The executable form of one query
#[derive(Debug, Clone)]
pub enum Driver {
    /// Incomplete or non-SQL query
    NoOp,
    /// Structured builder query
    Builder(BuilderDriver),
    /// Raw SQL with macros
    Code(CodeDriver),
}

impl Driver {
    /// Select and construct the driver for a query description
    ///
    /// Builder and Code require a schema snapshot; passing `None` for a
    /// query that selects one of those is a configuration error.
    pub fn from_request(
        query: &QueryRequest,
        ctx: &QueryContext,
        schema: Option<&TableSchema>,
    ) -> SqlResult<Self> {
        let need_schema = || {
            schema.ok_or_else(|| {
                SqlError::Configuration(format!("no schema available for table {}", query.table))
            })
        };

        match DriverKind::select(query) {
            DriverKind::NoOp => Ok(Self::NoOp),
            DriverKind::Builder => Ok(Self::Builder(BuilderDriver::new(
                query,
                ctx,
                need_schema()?,
            )?)),
            DriverKind::Code => Ok(Self::Code(CodeDriver::new(query, ctx, need_schema()?)?)),
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> DriverKind {
        match self {
            Self::NoOp => DriverKind::NoOp,
            Self::Builder(_) => DriverKind::Builder,
            Self::Code(_) => DriverKind::Code,
        }
    }

    /// Whether this driver produces a query worth executing
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Render the SQL for this query
    pub fn render_sql(&self) -> SqlResult<String> {
        match self {
            Self::NoOp => Ok(NOOP_SQL.to_string()),
            Self::Builder(driver) => driver.render_sql(),
            Self::Code(driver) => driver.render_sql(),
        }
    }

    /// Shape raw results into a frame
    pub fn extract_results(&self, table: &ResultTable) -> ExtractResult<Frame> {
        match self {
            Self::NoOp => Ok(Frame::default()),
            Self::Builder(driver) => driver.extract_results(table),
            Self::Code(driver) => driver.extract_results(table),
        }
    }
}
