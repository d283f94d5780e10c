//! Query Description Model
//!
//! Defines the serializable query description shared by the SQL compiler, the
//! drivers, and the API layer. Every field is defaulted so that partially
//! filled editor states still deserialize; validation happens at driver
//! construction, not here.
//!
//! # Example
//!
//! ```rust
//! use trellis::request::{QueryRequest, EditorMode};
//!
//! let mut query = QueryRequest::default();
//! query.table = "pageviews".into();
//! query.time_column = "ts".into();
//! query.metric_column = "views".into();
//! query.aggregation = "SUM".into();
//! assert_eq!(query.editor_mode, EditorMode::Builder);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default alias for the time column in generated SQL and result frames
pub const DEFAULT_TIME_ALIAS: &str = "time";

/// Default alias for the metric column in generated SQL and result frames
pub const DEFAULT_METRIC_ALIAS: &str = "metric";

/// Default row limit for generated queries
pub const DEFAULT_QUERY_LIMIT: i64 = 100_000;

/// Default row limit for single/distinct column listings
pub const DEFAULT_LISTING_LIMIT: i64 = 100;

/// Default row limit for log-style listings
pub const DEFAULT_LOG_LIMIT: i64 = 1_000;

/// Default declared time format for code-mode result columns
pub const DEFAULT_CODE_TIME_FORMAT: &str = "1:MILLISECONDS:EPOCH";

/// Kind of query the panel is asking for
///
/// Unknown values are tolerated (they deserialize to [`QueryType::Unknown`])
/// and route to the no-op driver rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// A SQL query against a store table
    Sql,
    /// Anything this service does not execute
    #[serde(other)]
    Unknown,
}

impl Default for QueryType {
    fn default() -> Self {
        Self::Sql
    }
}

/// Which editor surface produced the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Structured field-by-field editor
    Builder,
    /// Raw SQL with macro placeholders
    Code,
}

impl Default for EditorMode {
    fn default() -> Self {
        Self::Builder
    }
}

/// How the panel wants the result shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// Wide frame with one column per series (the default)
    TimeSeries,
    /// Columns exactly as returned by the store
    Table,
}

impl Default for DisplayType {
    fn default() -> Self {
        Self::TimeSeries
    }
}

/// Aggregation functions available in the builder editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// No aggregation, select raw rows
    None,
    /// Row count
    Count,
    /// Sum of values
    Sum,
    /// Average of values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl Aggregation {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "COUNT" => Some(Self::Count),
            "SUM" => Some(Self::Sum),
            "AVG" | "AVERAGE" => Some(Self::Avg),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }

    /// Whether this aggregation groups rows
    pub fn is_aggregating(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Count => write!(f, "COUNT"),
            Self::Sum => write!(f, "SUM"),
            Self::Avg => write!(f, "AVG"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

/// Sort direction for an explicit ORDER BY entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Asc
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// One explicit ORDER BY entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderByExpr {
    /// Column (or alias) to order by
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl OrderByExpr {
    /// Create a new ORDER BY entry
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// A structured filter on one dimension column
///
/// The operator is carried as its wire token (`=`, `!=`, `contains`,
/// `not-contains`, `like`, `not-like`, `>`, `<`, `>=`, `<=`); the compiler
/// resolves it and renders a tautology for anything it does not recognize,
/// so a half-edited filter never fails a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionFilter {
    /// Column the filter applies to
    pub column_name: String,
    /// Operator wire token
    pub operator: String,
    /// Pre-quoted SQL literal expressions, OR-combined
    pub value_exprs: Vec<String>,
}

impl DimensionFilter {
    /// Create a new filter
    pub fn new(
        column_name: impl Into<String>,
        operator: impl Into<String>,
        value_exprs: Vec<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            operator: operator.into(),
            value_exprs,
        }
    }
}

/// One `SET name=value;` prologue option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOption {
    /// Option name
    pub name: String,
    /// Option value
    pub value: String,
}

impl QueryOption {
    /// Create a new query option
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Inclusive time range a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive)
    pub from: DateTime<Utc>,
    /// End of the range (inclusive)
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range from two instants
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Create a range from epoch milliseconds
    ///
    /// Out-of-range values clamp to the epoch rather than panic; dashboard
    /// hosts occasionally send sentinel values during editor startup.
    pub fn from_epoch_millis(from_ms: i64, to_ms: i64) -> Self {
        let at = |ms| {
            Utc.timestamp_millis_opt(ms)
                .single()
                .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap_or_default())
        };
        Self {
            from: at(from_ms),
            to: at(to_ms),
        }
    }

    /// Range covering the last `hours` hours, ending now
    pub fn last_hours(hours: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - chrono::Duration::hours(hours),
            to,
        }
    }

    /// Length of the range as a chrono duration
    pub fn span(&self) -> chrono::Duration {
        self.to - self.from
    }
}

/// Per-execution context supplied by the dashboard host alongside the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryContext {
    /// Time range the panel is viewing
    pub time_range: TimeRange,
    /// Suggested bucket interval for the panel width
    pub interval: Duration,
    /// Maximum number of points the panel can render
    pub max_data_points: Option<i64>,
}

impl QueryContext {
    /// Create a context from a range and interval
    pub fn new(time_range: TimeRange, interval: Duration) -> Self {
        Self {
            time_range,
            interval,
            max_data_points: None,
        }
    }

    /// Attach a max-data-points hint
    pub fn with_max_data_points(mut self, points: i64) -> Self {
        self.max_data_points = Some(points);
        self
    }
}

/// The full serializable query description
///
/// Field semantics depend on the editor mode: builder queries use the
/// structured columns/aggregation fields, code queries use `code` plus the
/// alias and time-format overrides. Blank alias/format fields mean "use the
/// fixed default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    /// Kind of query (non-SQL kinds route to the no-op driver)
    pub query_type: QueryType,
    /// Editor surface that produced the query
    pub editor_mode: EditorMode,
    /// Result shaping for code queries
    pub display_type: DisplayType,
    /// Target table name
    pub table: String,
    /// Time column (builder mode)
    pub time_column: String,
    /// Metric column (builder mode)
    pub metric_column: String,
    /// Aggregation name: NONE, COUNT, SUM, AVG, MIN, MAX (builder mode)
    pub aggregation: String,
    /// Group-by columns (builder mode)
    pub group_by_columns: Vec<String>,
    /// Structured dimension filters (builder mode)
    pub dimension_filters: Vec<DimensionFilter>,
    /// Explicit ORDER BY entries (builder mode, grouped queries)
    pub order_by: Vec<OrderByExpr>,
    /// Explicit row limit; values below 1 mean "unset"
    pub limit: i64,
    /// Bucket expression `<n>:<UNIT>`, or `auto`/blank for interval-derived
    pub granularity: String,
    /// `SET name=value;` prologue options
    pub query_options: Vec<QueryOption>,
    /// Raw SQL with macro placeholders (code mode)
    pub code: String,
    /// Alias of the time column in results; blank for the default
    pub time_alias: String,
    /// Alias of the metric column in results; blank for the default
    pub metric_alias: String,
    /// Declared time format of the result time column (code mode);
    /// blank for epoch milliseconds
    pub time_format: String,
}

impl QueryRequest {
    /// Effective time alias (the default when blank)
    pub fn time_alias(&self) -> &str {
        if self.time_alias.trim().is_empty() {
            DEFAULT_TIME_ALIAS
        } else {
            self.time_alias.trim()
        }
    }

    /// Effective metric alias (the default when blank)
    pub fn metric_alias(&self) -> &str {
        if self.metric_alias.trim().is_empty() {
            DEFAULT_METRIC_ALIAS
        } else {
            self.metric_alias.trim()
        }
    }

    /// Effective declared time format for code-mode results
    pub fn time_format(&self) -> &str {
        if self.time_format.trim().is_empty() {
            DEFAULT_CODE_TIME_FORMAT
        } else {
            self.time_format.trim()
        }
    }
}
