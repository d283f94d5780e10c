//! Trellis SQL Compilation
//!
//! Turns dashboard query requests into backend SQL:
//!
//! - **Time formats**: the seven epoch encodings plus simple-date-format
//! - **Granularity**: `<count>:<UNIT>` parsing and largest-unit rendering
//! - **Time expressions**: range filters and `DATETIMECONVERT` bucketing
//! - **Filters**: structured dimension filters to WHERE predicates
//! - **Macros**: `$__table`, `$__timeFilter(col)` and friends for code mode
//! - **Templates**: the four fixed query shapes, rendered byte-exact
//!
//! # Macro Language
//!
//! ```text
//! SELECT
//!   $__timeGroup(ts) AS $__timeAlias,
//!   COUNT(*) AS $__metricAlias
//! FROM $__table
//! WHERE $__timeFilter(ts)
//! GROUP BY $__timeAlias
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use trellis::sql::{MacroEngine, TimeExpressionBuilder};
//!
//! // Compile a code-mode query
//! let engine = MacroEngine::new("pageviews", &schema, &range, bucket, "time", "metric");
//! let sql = engine.expand(raw_code)?;
//!
//! // Or build the pieces directly
//! let time_expr = TimeExpressionBuilder::new(&schema, "ts")?;
//! let filter = time_expr.time_filter_expr(&range);
//! ```

mod error;
mod filter;
pub mod granularity;
mod macros;
mod templates;
mod timeexpr;
mod timefmt;

pub use error::{SqlError, SqlResult};
pub use filter::{compile_dimension_filter, FilterOperator, TAUTOLOGY};
pub use macros::MacroEngine;
pub use templates::{
    ColumnListingTemplate, GroupedSeriesTemplate, LogListingTemplate, RawSeriesTemplate,
};
pub use timeexpr::{TimeExpressionBuilder, OUTPUT_FORMAT_MILLIS};
pub use timefmt::{EpochUnit, SdfPattern, TimeExprFormat};

/// Quote an identifier for the SQL dialect
///
/// Wraps the name in double quotes and doubles any embedded quote. Every
/// identifier this crate emits goes through here, so generated SQL never
/// depends on the dialect's unquoted-identifier rules.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
