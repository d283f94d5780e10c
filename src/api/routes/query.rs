//! Query Routes
//!
//! Endpoints for executing panel queries and previewing the SQL they
//! compile to.
//!
//! - POST /api/v1/query - Execute a batch of queries
//! - POST /api/v1/render - Render the SQL for the first query without executing

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::{
    BatchQueryRequest, BatchQueryResponse, DataQueryDto, FrameDto, QueryResultDto, RenderResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::driver::{Driver, DriverKind};
use crate::request::{QueryContext, QueryRequest, TimeRange};

/// POST /api/v1/query
///
/// Execute every query in the batch and return one result per entry.
/// Failures are isolated: a bad query produces a result with an error
/// message, the rest of the batch still runs.
pub async fn execute_queries(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchQueryRequest>,
) -> ApiResult<Json<BatchQueryResponse>> {
    let mut results = Vec::with_capacity(req.queries.len());

    for dto in &req.queries {
        let result = match run_query(&state, dto).await {
            Ok(frames) => QueryResultDto {
                ref_id: dto.ref_id.clone(),
                frames,
                error: None,
            },
            Err(e) => {
                tracing::warn!(ref_id = %dto.ref_id, error = %e, "query failed");
                QueryResultDto {
                    ref_id: dto.ref_id.clone(),
                    frames: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    Ok(Json(BatchQueryResponse { results }))
}

/// POST /api/v1/render
///
/// Compile the first query in the batch to SQL without executing it.
/// Used by the editor's query inspector.
pub async fn render_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchQueryRequest>,
) -> ApiResult<Json<RenderResponse>> {
    let dto = req
        .queries
        .first()
        .ok_or_else(|| ApiError::Validation("queries cannot be empty".to_string()))?;

    let context = build_context(dto)?;
    let driver = build_driver(&state, &dto.query, &context).await?;
    let sql = driver.render_sql()?;

    Ok(Json(RenderResponse {
        ref_id: dto.ref_id.clone(),
        sql,
    }))
}

/// Execute one query end to end
async fn run_query(state: &AppState, dto: &DataQueryDto) -> ApiResult<Vec<FrameDto>> {
    let context = build_context(dto)?;
    let driver = build_driver(state, &dto.query, &context).await?;

    // No-op queries succeed with no frames
    if driver.is_noop() {
        return Ok(Vec::new());
    }

    let sql = driver.render_sql()?;
    tracing::debug!(table = %dto.query.table, sql = %sql, "executing query");

    let table = state.backend.execute_sql(&dto.query.table, &sql).await?;
    let frame = driver.extract_results(&table)?;

    Ok(vec![FrameDto::from(&frame)])
}

/// Build the execution context from the request envelope
fn build_context(dto: &DataQueryDto) -> ApiResult<QueryContext> {
    let from_ms = parse_timestamp(&dto.from)?;
    let to_ms = parse_timestamp(&dto.to)?;

    if from_ms >= to_ms {
        return Err(ApiError::Validation("from must be before to".to_string()));
    }

    let range = TimeRange::from_epoch_millis(from_ms, to_ms);
    let interval = Duration::from_millis(dto.interval_ms.max(1) as u64);

    let mut context = QueryContext::new(range, interval);
    if let Some(points) = dto.max_data_points {
        context = context.with_max_data_points(points);
    }

    Ok(context)
}

/// Construct the driver, fetching the table schema only when one is needed
async fn build_driver(
    state: &AppState,
    query: &QueryRequest,
    context: &QueryContext,
) -> ApiResult<Driver> {
    let schema = match DriverKind::select(query) {
        DriverKind::NoOp => None,
        _ => Some(state.schema(&query.table).await?),
    };

    Ok(Driver::from_request(query, context, schema.as_ref())?)
}

/// Parse a timestamp string
pub(crate) fn parse_timestamp(s: &str) -> ApiResult<i64> {
    // Try parsing as raw milliseconds timestamp first (most common from frontend)
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }

    // Handle relative times like "now", "now-7d"
    if s.starts_with("now") {
        return parse_relative_time(s);
    }

    // Try parsing as ISO 8601
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }

    // Try parsing as ISO 8601 without timezone (assume UTC)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc().timestamp_millis());
    }

    // Try parsing as date only
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    Err(ApiError::Validation(format!(
        "Cannot parse timestamp: {}",
        s
    )))
}

/// Parse relative time like "now-7d"
fn parse_relative_time(s: &str) -> ApiResult<i64> {
    let now = Utc::now().timestamp_millis();

    if s == "now" {
        return Ok(now);
    }

    // Parse "now-Nh", "now-Nd", "now-Nw", "now-Nm"
    let re = regex::Regex::new(r"^now-(\d+)([hdwm])$")
        .map_err(|_| ApiError::Internal("Regex error".to_string()))?;

    if let Some(caps) = re.captures(s) {
        let amount: i64 = caps[1]
            .parse()
            .map_err(|_| ApiError::Validation("Invalid number in time expression".to_string()))?;
        let unit = &caps[2];

        let ms = match unit {
            "h" => amount * 3600 * 1000,
            "d" => amount * 24 * 3600 * 1000,
            "w" => amount * 7 * 24 * 3600 * 1000,
            "m" => amount * 30 * 24 * 3600 * 1000,
            _ => {
                return Err(ApiError::Validation(format!(
                    "Invalid time unit: {}",
                    unit
                )))
            }
        };

        return Ok(now - ms);
    }

    Err(ApiError::Validation(format!(
        "Cannot parse relative time: {}",
        s
    )))
}
