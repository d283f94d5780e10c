//! Analytics Store REST Client
//!
//! HTTP client for the store's controller (metadata) and broker (query)
//! endpoints, behind the [`StoreBackend`] capability trait so handlers and
//! tests can run against a stub backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use super::response::{BrokerResponse, ResultTable};
use super::schema::TableSchema;

/// The store capabilities this service consumes
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// List all table names
    async fn table_names(&self) -> StoreResult<Vec<String>>;

    /// Fetch the schema snapshot for a table
    async fn table_schema(&self, table: &str) -> StoreResult<TableSchema>;

    /// Execute a SQL query; the table name is advisory routing context
    async fn execute_sql(&self, table: &str, sql: &str) -> StoreResult<ResultTable>;

    /// Lightweight reachability probe for health reporting
    ///
    /// The default piggybacks on the table listing; backends with a
    /// dedicated health endpoint should override it.
    async fn reachable(&self) -> bool {
        self.table_names().await.is_ok()
    }
}

/// Connection settings for [`StoreClient`]
#[derive(Debug, Clone)]
pub struct StoreClientConfig {
    /// Controller base URL (metadata endpoints)
    pub controller_url: String,
    /// Broker base URL (query endpoint)
    pub broker_url: String,
    /// Optional bearer token sent with every request
    pub auth_token: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for StoreClientConfig {
    fn default() -> Self {
        Self {
            controller_url: "http://localhost:9000".to_string(),
            broker_url: "http://localhost:8099".to_string(),
            auth_token: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct SqlRequest<'a> {
    sql: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct TablesResponse {
    #[serde(default)]
    tables: Vec<String>,
}

/// REST client for the analytics store
pub struct StoreClient {
    client: Client,
    config: StoreClientConfig,
}

impl StoreClient {
    /// Create a new client with the given settings
    pub fn new(config: StoreClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Current connection settings
    pub fn config(&self) -> &StoreClientConfig {
        &self.config
    }

    /// Check whether the controller answers its health endpoint
    pub async fn health_check(&self) -> StoreResult<()> {
        let url = format!("{}/health", self.config.controller_url);
        let response = self.authorized(self.client.get(&url)).send().await.map_err(map_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(url))
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> StoreResult<T> {
        let response = self.authorized(self.client.get(url)).send().await.map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Response {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn map_transport(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else if e.is_connect() {
        StoreError::Unavailable(e.url().map(|u| u.to_string()).unwrap_or_default())
    } else {
        StoreError::Request(e)
    }
}

#[async_trait]
impl StoreBackend for StoreClient {
    async fn table_names(&self) -> StoreResult<Vec<String>> {
        let url = format!("{}/tables", self.config.controller_url);
        tracing::debug!(url = %url, "Listing tables");

        let response: TablesResponse = self.get_json(&url).await?;
        Ok(response.tables)
    }

    async fn table_schema(&self, table: &str) -> StoreResult<TableSchema> {
        let url = format!(
            "{}/tables/{}/schema",
            self.config.controller_url,
            urlencoding::encode(table)
        );
        tracing::debug!(table = %table, "Fetching schema");

        match self.get_json::<TableSchema>(&url).await {
            Ok(schema) => Ok(schema),
            Err(StoreError::Response { status: 404, .. }) => {
                Err(StoreError::SchemaNotFound(table.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn execute_sql(&self, table: &str, sql: &str) -> StoreResult<ResultTable> {
        let url = format!("{}/query/sql", self.config.broker_url);
        tracing::debug!(table = %table, sql = %sql, "Executing query");

        let response = self
            .authorized(self.client.post(&url).json(&SqlRequest { sql }))
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Response {
                status: status.as_u16(),
                body,
            });
        }

        let broker: BrokerResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if !broker.exceptions.is_empty() {
            let joined = broker
                .exceptions
                .iter()
                .map(|ex| format!("[{}] {}", ex.error_code, ex.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::Execution(joined));
        }

        Ok(broker.result_table.unwrap_or_default())
    }

    async fn reachable(&self) -> bool {
        self.health_check().await.is_ok()
    }
}
