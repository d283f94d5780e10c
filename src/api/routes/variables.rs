//! Variable Routes
//!
//! Endpoint backing dashboard template variables: the distinct values of
//! one column, optionally bounded to a time range.
//!
//! - POST /api/v1/variables - List a column's values

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{VariablesRequest, VariablesResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::query::parse_timestamp;
use crate::api::state::AppState;
use crate::frame::{column_index, extract_literal_exprs};
use crate::request::TimeRange;
use crate::sql::{ColumnListingTemplate, TimeExpressionBuilder};

/// POST /api/v1/variables
///
/// List one column's values. The response carries both display values and
/// ready-to-embed SQL literal expressions so callers never re-quote.
pub async fn list_variable_values(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VariablesRequest>,
) -> ApiResult<Json<VariablesResponse>> {
    if req.table.trim().is_empty() {
        return Err(ApiError::Validation("table is required".to_string()));
    }
    if req.column.trim().is_empty() {
        return Err(ApiError::Validation("column is required".to_string()));
    }

    let time_filter = match bounded_range(&req)? {
        Some((from_ms, to_ms, time_column)) => {
            let range = TimeRange::from_epoch_millis(from_ms, to_ms);
            let schema = state.schema(&req.table).await?;
            let expr = TimeExpressionBuilder::new(&schema, &time_column)?;
            Some(expr.time_filter_expr(&range))
        }
        None => None,
    };

    let sql = ColumnListingTemplate {
        table: &req.table,
        column: &req.column,
        distinct: req.distinct,
        time_filter,
        filters: &req.dimension_filters,
        options: &req.query_options,
        limit: req.limit,
    }
    .render();

    let table = state.backend.execute_sql(&req.table, &sql).await?;

    let idx = column_index(&table, &req.column).unwrap_or(0);
    let values = (0..table.row_count())
        .map(|row| table.string_value(row, idx).unwrap_or_default())
        .collect();
    let exprs = extract_literal_exprs(&table, idx);

    Ok(Json(VariablesResponse { values, exprs }))
}

/// Resolve the optional range bound
///
/// The listing is range-bounded only when the caller supplies all of
/// `from`, `to`, and a non-blank time column; anything less lists the
/// whole table.
fn bounded_range(req: &VariablesRequest) -> ApiResult<Option<(i64, i64, String)>> {
    let (from, to, time_column) = match (&req.from, &req.to, &req.time_column) {
        (Some(from), Some(to), Some(column)) if !column.trim().is_empty() => (from, to, column),
        _ => return Ok(None),
    };

    let from_ms = parse_timestamp(from)?;
    let to_ms = parse_timestamp(to)?;

    Ok(Some((from_ms, to_ms, time_column.trim().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> VariablesRequest {
        serde_json::from_str(json).expect("request should deserialize")
    }

    #[test]
    fn test_bounded_range_requires_all_parts() {
        let req = request(r#"{"table": "t", "column": "c"}"#);
        assert_eq!(bounded_range(&req).unwrap(), None);

        let req = request(r#"{"table": "t", "column": "c", "from": "1000", "to": "2000"}"#);
        assert_eq!(bounded_range(&req).unwrap(), None);

        let req = request(
            r#"{"table": "t", "column": "c", "from": "1000", "to": "2000", "timeColumn": "ts"}"#,
        );
        assert_eq!(
            bounded_range(&req).unwrap(),
            Some((1000, 2000, "ts".to_string()))
        );
    }

    #[test]
    fn test_bounded_range_rejects_bad_timestamps() {
        let req = request(
            r#"{"table": "t", "column": "c", "from": "soon", "to": "2000", "timeColumn": "ts"}"#,
        );
        assert!(bounded_range(&req).is_err());
    }
}
