//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::store::{StoreBackend, StoreResult, TableSchema, TtlCache};

/// Cache key for the table listing
const TABLES_KEY: &str = "tables";

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Store backend for table metadata and SQL execution
    pub backend: Arc<dyn StoreBackend>,
    /// Full service configuration
    pub config: Arc<Config>,
    /// Cached table listing
    tables_cache: Arc<TtlCache<Vec<String>>>,
    /// Cached schema snapshots, keyed by table name
    schema_cache: Arc<TtlCache<TableSchema>>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state over a backend
    pub fn new(backend: Arc<dyn StoreBackend>, config: Config) -> Self {
        let ttl = Duration::from_millis(config.store.schema_cache_ttl_ms);
        Self {
            backend,
            config: Arc::new(config),
            tables_cache: Arc::new(TtlCache::new(ttl)),
            schema_cache: Arc::new(TtlCache::new(ttl)),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Table listing, served from cache while fresh
    pub async fn tables(&self) -> StoreResult<Vec<String>> {
        if let Some(tables) = self.tables_cache.get(TABLES_KEY).await {
            return Ok(tables);
        }
        let tables = self.backend.table_names().await?;
        self.tables_cache.put(TABLES_KEY, tables.clone()).await;
        Ok(tables)
    }

    /// Schema snapshot for a table, served from cache while fresh
    pub async fn schema(&self, table: &str) -> StoreResult<TableSchema> {
        if let Some(schema) = self.schema_cache.get(table).await {
            return Ok(schema);
        }
        let schema = self.backend.table_schema(table).await?;
        self.schema_cache.put(table, schema.clone()).await;
        Ok(schema)
    }

    /// Drop all cached metadata
    pub async fn invalidate_caches(&self) {
        self.tables_cache.clear().await;
        self.schema_cache.clear().await;
    }
}
