//! Log Routes
//!
//! Endpoint for log-style row listings: time plus message plus optional
//! metadata columns, oldest first.
//!
//! - POST /api/v1/logs - List log rows in a time range

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{FrameDto, LogsRequest, LogsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::query::parse_timestamp;
use crate::api::state::AppState;
use crate::frame::extract_table_frame;
use crate::request::TimeRange;
use crate::sql::{LogListingTemplate, TimeExpressionBuilder};
use crate::store::TableSchema;

/// POST /api/v1/logs
///
/// List log rows. The time column defaults to the table's primary
/// date-time column when the request leaves it blank.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogsRequest>,
) -> ApiResult<Json<LogsResponse>> {
    if req.table.trim().is_empty() {
        return Err(ApiError::Validation("table is required".to_string()));
    }
    if req.message_column.trim().is_empty() {
        return Err(ApiError::Validation(
            "message column is required".to_string(),
        ));
    }

    let from_ms = parse_timestamp(&req.from)?;
    let to_ms = parse_timestamp(&req.to)?;
    let range = TimeRange::from_epoch_millis(from_ms, to_ms);

    let schema = state.schema(&req.table).await?;
    let time_column = resolve_time_column(&req.time_column, &schema)?;
    let expr = TimeExpressionBuilder::new(&schema, &time_column)?;

    let sql = LogListingTemplate {
        table: &req.table,
        time_column: &time_column,
        message_column: &req.message_column,
        metadata_columns: &req.metadata_columns,
        time_filter: Some(expr.time_filter_expr(&range)),
        filters: &req.dimension_filters,
        options: &req.query_options,
        limit: req.limit,
    }
    .render();

    let table = state.backend.execute_sql(&req.table, &sql).await?;
    let frame = extract_table_frame(&table, expr.format(), &time_column)?;

    Ok(Json(LogsResponse {
        frame: FrameDto::from(&frame),
    }))
}

/// The explicit time column when given, otherwise the table's primary one
fn resolve_time_column(requested: &str, schema: &TableSchema) -> ApiResult<String> {
    if !requested.trim().is_empty() {
        return Ok(requested.trim().to_string());
    }

    schema
        .primary_time_column()
        .map(|f| f.name.clone())
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "table {} declares no time column; specify one",
                schema.schema_name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> TableSchema {
        serde_json::from_str(json).expect("schema should deserialize")
    }

    #[test]
    fn test_resolve_time_column_explicit_wins() {
        let schema = schema(
            r#"{
                "schemaName": "logs",
                "dateTimeFieldSpecs": [
                    {"name": "ts", "dataType": "LONG", "format": "1:MILLISECONDS:EPOCH", "granularity": "1:MILLISECONDS"}
                ]
            }"#,
        );

        assert_eq!(resolve_time_column(" ingested ", &schema).unwrap(), "ingested");
        assert_eq!(resolve_time_column("", &schema).unwrap(), "ts");
    }

    #[test]
    fn test_resolve_time_column_requires_declaration() {
        let schema = schema(r#"{"schemaName": "bare"}"#);

        let err = resolve_time_column("", &schema).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
