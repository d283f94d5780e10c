//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON. Field names follow
//! the dashboard host's wire conventions (camelCase, `refId`, `intervalMs`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frame::{Field, FieldValues, Frame};
use crate::request::{DimensionFilter, QueryOption, QueryRequest};

// ============================================
// QUERY DTOs
// ============================================

/// Batch query request, one entry per panel target
#[derive(Debug, Deserialize)]
pub struct BatchQueryRequest {
    /// Queries to execute
    pub queries: Vec<DataQueryDto>,
}

/// One query plus its execution context
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryDto {
    /// Caller-assigned identifier echoed back in the result
    #[serde(default)]
    pub ref_id: String,
    /// Range start: epoch millis, RFC3339, or `now-6h` style
    pub from: String,
    /// Range end, same formats as `from`
    pub to: String,
    /// Suggested bucket interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: i64,
    /// Maximum number of points the panel can render
    #[serde(default)]
    pub max_data_points: Option<i64>,
    /// The query description itself
    #[serde(flatten)]
    pub query: QueryRequest,
}

fn default_interval_ms() -> i64 {
    60_000
}

/// Batch query response
#[derive(Debug, Serialize)]
pub struct BatchQueryResponse {
    /// One result per query, in request order
    pub results: Vec<QueryResultDto>,
}

/// Result of a single query
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultDto {
    /// Identifier from the request
    pub ref_id: String,
    /// Result frames; empty for no-op queries
    pub frames: Vec<FrameDto>,
    /// Error message when this query failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rendered SQL for a query, without executing it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    /// Identifier from the request
    pub ref_id: String,
    /// The SQL that would be sent to the store
    pub sql: String,
}

// ============================================
// FRAME DTOs
// ============================================

/// Serialized data frame
#[derive(Debug, Serialize)]
pub struct FrameDto {
    /// Frame name
    pub name: String,
    /// Columnar fields
    pub fields: Vec<FieldDto>,
}

/// One column of a serialized frame
#[derive(Debug, Serialize)]
pub struct FieldDto {
    /// Field name
    pub name: String,
    /// Value kind: "time", "number" or "string"
    #[serde(rename = "type")]
    pub field_type: String,
    /// Column values; time values are epoch milliseconds
    pub values: Vec<Value>,
}

impl From<&Field> for FieldDto {
    fn from(field: &Field) -> Self {
        let (field_type, values) = match &field.values {
            FieldValues::Long(v) => ("number", v.iter().map(|x| Value::from(*x)).collect()),
            FieldValues::Double(v) => ("number", v.iter().map(|x| Value::from(*x)).collect()),
            FieldValues::NullableDouble(v) => (
                "number",
                v.iter()
                    .map(|x| x.map(Value::from).unwrap_or(Value::Null))
                    .collect(),
            ),
            FieldValues::String(v) => ("string", v.iter().map(|x| Value::from(x.clone())).collect()),
            FieldValues::Time(v) => (
                "time",
                v.iter()
                    .map(|x| Value::from(x.timestamp_millis()))
                    .collect(),
            ),
        };

        Self {
            name: field.name.clone(),
            field_type: field_type.to_string(),
            values,
        }
    }
}

impl From<&Frame> for FrameDto {
    fn from(frame: &Frame) -> Self {
        Self {
            name: frame.name.clone(),
            fields: frame.fields.iter().map(FieldDto::from).collect(),
        }
    }
}

// ============================================
// VARIABLE DTOs
// ============================================

/// Request for the distinct values of one column
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesRequest {
    /// Table to list from
    pub table: String,
    /// Column to list
    pub column: String,
    /// Whether to deduplicate values
    #[serde(default = "default_distinct")]
    pub distinct: bool,
    /// Optional range start; the listing is unfiltered without a full range
    #[serde(default)]
    pub from: Option<String>,
    /// Optional range end
    #[serde(default)]
    pub to: Option<String>,
    /// Time column for range filtering
    #[serde(default)]
    pub time_column: Option<String>,
    /// Structured dimension filters
    #[serde(default)]
    pub dimension_filters: Vec<DimensionFilter>,
    /// `SET name=value;` prologue options
    #[serde(default)]
    pub query_options: Vec<QueryOption>,
    /// Row limit; values below 1 mean "unset"
    #[serde(default)]
    pub limit: i64,
}

fn default_distinct() -> bool {
    true
}

/// Distinct values of one column
#[derive(Debug, Serialize)]
pub struct VariablesResponse {
    /// Display values, in store order
    pub values: Vec<String>,
    /// The same values as ready-to-embed SQL literal expressions
    pub exprs: Vec<String>,
}

// ============================================
// LOG DTOs
// ============================================

/// Request for log-style rows
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsRequest {
    /// Table to read from
    pub table: String,
    /// Time column; blank resolves to the table's primary time column
    #[serde(default)]
    pub time_column: String,
    /// Column holding the log line
    pub message_column: String,
    /// Extra columns to carry alongside the message
    #[serde(default)]
    pub metadata_columns: Vec<String>,
    /// Range start
    pub from: String,
    /// Range end
    pub to: String,
    /// Structured dimension filters
    #[serde(default)]
    pub dimension_filters: Vec<DimensionFilter>,
    /// `SET name=value;` prologue options
    #[serde(default)]
    pub query_options: Vec<QueryOption>,
    /// Row limit; values below 1 mean "unset"
    #[serde(default)]
    pub limit: i64,
}

/// Log rows as a table frame
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    /// Time-led frame of log rows
    pub frame: FrameDto,
}

// ============================================
// TABLE DTOs
// ============================================

/// Tables known to the store
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    /// Table names
    pub tables: Vec<String>,
    /// Number of tables
    pub total: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Service health report
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Store reachability: "ok" or "error"
    pub store: String,
    /// Seconds since the service started
    pub uptime_seconds: u64,
    /// Service version
    pub version: String,
}
