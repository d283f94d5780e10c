//! Trellis REST API
//!
//! HTTP API layer for Trellis, built with Axum.
//!
//! # Endpoints
//!
//! ## Query
//! - `POST /api/v1/query` - Execute a batch of queries
//! - `POST /api/v1/render` - Render the SQL for a query without executing
//!
//! ## Metadata
//! - `GET /api/v1/tables` - List tables known to the store
//! - `GET /api/v1/tables/:table/schema` - Fetch one table's schema
//!
//! ## Variables
//! - `POST /api/v1/variables` - List a column's values for template variables
//!
//! ## Logs
//! - `POST /api/v1/logs` - List log rows in a time range
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis::api::{serve, AppState};
//! use trellis::config::Config;
//! use trellis::store::{StoreClient, StoreClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = StoreClient::new(StoreClientConfig::default());
//!
//!     let state = AppState::new(Arc::new(client), config.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.api.request_timeout_secs.max(1));
    let cors = cors_layer(&state.config.api.cors_origins);

    let api_routes = Router::new()
        // Query routes
        .route("/query", post(routes::query::execute_queries))
        .route("/render", post(routes::query::render_query))
        // Metadata routes
        .route("/tables", get(routes::tables::list_tables))
        .route("/tables/:table/schema", get(routes::tables::get_table_schema))
        // Variable routes
        .route("/variables", post(routes::variables::list_variable_values))
        // Log routes
        .route("/logs", post(routes::logs::list_logs));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Map middleware failures to plain status responses
async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// CORS from the configured origin list
///
/// An empty list or a `*` entry opens the API up; anything else allows
/// exactly the listed origins. Unparseable entries are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Trellis API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Trellis API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{ResultTable, StoreBackend, StoreError, StoreResult, TableSchema};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    struct StubBackend {
        tables: Vec<String>,
        schema: TableSchema,
        result: ResultTable,
    }

    #[async_trait]
    impl StoreBackend for StubBackend {
        async fn table_names(&self) -> StoreResult<Vec<String>> {
            Ok(self.tables.clone())
        }

        async fn table_schema(&self, table: &str) -> StoreResult<TableSchema> {
            if table == self.schema.schema_name {
                Ok(self.schema.clone())
            } else {
                Err(StoreError::SchemaNotFound(table.to_string()))
            }
        }

        async fn execute_sql(&self, _table: &str, _sql: &str) -> StoreResult<ResultTable> {
            Ok(self.result.clone())
        }
    }

    fn sample_schema() -> TableSchema {
        serde_json::from_value(json!({
            "schemaName": "pageviews",
            "dimensionFieldSpecs": [{"name": "country", "dataType": "STRING"}],
            "metricFieldSpecs": [{"name": "views", "dataType": "LONG"}],
            "dateTimeFieldSpecs": [{
                "name": "ts",
                "dataType": "LONG",
                "format": "1:MILLISECONDS:EPOCH",
                "granularity": "1:MILLISECONDS"
            }]
        }))
        .unwrap()
    }

    fn series_result() -> ResultTable {
        serde_json::from_value(json!({
            "dataSchema": {
                "columnNames": ["time", "metric"],
                "columnDataTypes": ["LONG", "DOUBLE"]
            },
            "rows": [[1000, 5.0], [2000, 7.5]]
        }))
        .unwrap()
    }

    fn test_app(result: ResultTable) -> Router {
        let backend = StubBackend {
            tables: vec!["pageviews".to_string()],
            schema: sample_schema(),
            result,
        };
        let state = AppState::new(Arc::new(backend), Config::default());
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "ok");
    }

    #[tokio::test]
    async fn test_list_tables() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tables")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["tables"], json!(["pageviews"]));
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_schema_unknown_table_is_404() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tables/missing/schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SCHEMA_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_query_blank_table_is_noop() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"queries": [{"refId": "A", "from": "1000", "to": "2000"}]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["results"][0]["refId"], "A");
        assert_eq!(body["results"][0]["frames"], json!([]));
        assert!(body["results"][0].get("error").is_none());
    }

    #[tokio::test]
    async fn test_query_builder_end_to_end() {
        let app = test_app(series_result());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"queries": [{
                            "refId": "A",
                            "from": "1000",
                            "to": "2000000",
                            "table": "pageviews",
                            "timeColumn": "ts",
                            "metricColumn": "views",
                            "aggregation": "SUM"
                        }]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let frame = &body["results"][0]["frames"][0];
        assert_eq!(frame["name"], "metric");
        assert_eq!(frame["fields"][0]["name"], "metric");
        assert_eq!(frame["fields"][0]["type"], "number");
        assert_eq!(frame["fields"][0]["values"], json!([5.0, 7.5]));
        assert_eq!(frame["fields"][1]["name"], "time");
        assert_eq!(frame["fields"][1]["type"], "time");
        assert_eq!(frame["fields"][1]["values"], json!([1000, 2000]));
    }

    #[tokio::test]
    async fn test_query_failure_is_isolated() {
        let app = test_app(series_result());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/query")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"queries": [
                            {"refId": "A", "from": "1000", "to": "2000000", "table": "unknown",
                             "timeColumn": "ts", "metricColumn": "views", "aggregation": "SUM"},
                            {"refId": "B", "from": "1000", "to": "2000000"}
                        ]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["results"][0]["error"].is_string());
        assert_eq!(body["results"][1]["refId"], "B");
        assert!(body["results"][1].get("error").is_none());
    }

    #[tokio::test]
    async fn test_render_returns_sql() {
        let app = test_app(ResultTable::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/render")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"queries": [{
                            "refId": "A",
                            "from": "1000",
                            "to": "2000000",
                            "table": "pageviews",
                            "timeColumn": "ts",
                            "metricColumn": "views",
                            "aggregation": "SUM"
                        }]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let sql = body["sql"].as_str().unwrap();
        assert!(sql.contains("FROM \"pageviews\""));
        assert!(sql.contains("DATETIMECONVERT"));
        assert!(sql.contains("SUM(\"views\")"));
    }

    #[tokio::test]
    async fn test_variables_endpoint() {
        let result: ResultTable = serde_json::from_value(json!({
            "dataSchema": {
                "columnNames": ["country"],
                "columnDataTypes": ["STRING"]
            },
            "rows": [["US"], ["DE"]]
        }))
        .unwrap();
        let app = test_app(result);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/variables")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"table": "pageviews", "column": "country"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["values"], json!(["US", "DE"]));
        assert_eq!(body["exprs"], json!(["'US'", "'DE'"]));
    }

    #[tokio::test]
    async fn test_logs_endpoint() {
        let result: ResultTable = serde_json::from_value(json!({
            "dataSchema": {
                "columnNames": ["ts", "message"],
                "columnDataTypes": ["LONG", "STRING"]
            },
            "rows": [[1000, "started"], [2000, "stopped"]]
        }))
        .unwrap();
        let app = test_app(result);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/logs")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"table": "pageviews", "messageColumn": "message",
                            "from": "1000", "to": "2000000"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["frame"]["fields"][0]["name"], "ts");
        assert_eq!(body["frame"]["fields"][0]["type"], "time");
        assert_eq!(body["frame"]["fields"][1]["values"], json!(["started", "stopped"]));
    }
}
