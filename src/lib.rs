//! # Trellis
//!
//! Dashboard query compiler for columnar analytics stores - compiles
//! declarative panel queries into dialect SQL and reshapes the store's typed
//! results into visualization-ready frames.
//!
//! ## Features
//!
//! - **Byte-exact SQL**: fixed structural templates with a stable whitespace
//!   contract, verified literally in tests
//! - **Time-format catalog**: seven epoch encodings, timestamp columns, and
//!   Java-style date patterns behind one resolve/encode/decode surface
//! - **Macro language**: `$__table()`, `$__timeFilter(col)`,
//!   `$__timeGroup(col)`, `$__timeAlias()`, `$__metricAlias()` expanded in a
//!   single left-to-right pass
//! - **Three drivers**: no-op, builder, and raw-code queries behind one
//!   render/extract contract
//! - **Wide frames**: long-to-wide pivoting with labeled series columns
//!
//! ## Modules
//!
//! - [`request`]: the serializable query description
//! - [`sql`]: time formats, macros, filters, and the SQL templates
//! - [`driver`]: query-driver selection and orchestration
//! - [`frame`]: typed column extraction and the time-series pivot
//! - [`store`]: analytics-store client, wire models, and caching
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis::driver::Driver;
//! use trellis::request::{QueryContext, QueryRequest, TimeRange};
//! use trellis::store::TableSchema;
//!
//! fn render(schema: &TableSchema) -> Result<String, Box<dyn std::error::Error>> {
//!     let mut query = QueryRequest::default();
//!     query.table = "pageviews".into();
//!     query.time_column = "ts".into();
//!     query.metric_column = "views".into();
//!     query.aggregation = "SUM".into();
//!
//!     let ctx = QueryContext {
//!         time_range: TimeRange::from_epoch_millis(1388534400000, 1391212800000),
//!         interval: std::time::Duration::from_secs(3600),
//!         max_data_points: Some(1000),
//!     };
//!
//!     let driver = Driver::from_request(&query, &ctx, Some(schema))?;
//!     Ok(driver.render_sql()?)
//! }
//! ```

pub mod api;
pub mod config;
pub mod driver;
pub mod frame;
pub mod request;
pub mod sql;
pub mod store;

// Re-export top-level types for convenience
pub use request::{
    Aggregation, DimensionFilter, DisplayType, EditorMode, OrderByExpr, QueryContext, QueryOption,
    QueryRequest, QueryType, SortDirection, TimeRange, DEFAULT_METRIC_ALIAS, DEFAULT_TIME_ALIAS,
};

pub use sql::{
    compile_dimension_filter, EpochUnit, MacroEngine, SqlError, SqlResult, TimeExprFormat,
    TimeExpressionBuilder,
};

pub use driver::{BuilderDriver, CodeDriver, Driver, DriverKind};

pub use frame::{
    ExtractError, ExtractResult, Field, FieldValues, Frame, TimeSeriesMetric,
};

pub use store::{
    DataType, ResultTable, StoreBackend, StoreClient, StoreError, StoreResult, TableSchema,
    TtlCache,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StoreConfig};
