//! Table Routes
//!
//! Metadata endpoints backing the query editor's table and column pickers.
//!
//! - GET /api/v1/tables - List tables known to the store
//! - GET /api/v1/tables/:table/schema - Fetch one table's schema

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::TablesResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::store::TableSchema;

/// GET /api/v1/tables
///
/// List table names, served from the metadata cache when fresh.
pub async fn list_tables(State(state): State<Arc<AppState>>) -> ApiResult<Json<TablesResponse>> {
    let tables = state.tables().await?;
    let total = tables.len();

    Ok(Json(TablesResponse { tables, total }))
}

/// GET /api/v1/tables/:table/schema
///
/// Fetch the schema snapshot for one table.
pub async fn get_table_schema(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> ApiResult<Json<TableSchema>> {
    let schema = state.schema(&table).await?;
    Ok(Json(schema))
}
