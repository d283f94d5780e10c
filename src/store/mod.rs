//! Analytics Store Access
//!
//! Everything that touches the analytics store lives here: the wire models
//! for schemas and query results, the REST client, and the short-TTL cache
//! that fronts metadata lookups.
//!
//! ## Architecture
//!
//! - **Schema**: table schema snapshots fetched from the controller
//! - **Response**: the broker's tabular result envelope with typed getters
//! - **Client**: reqwest client behind the [`StoreBackend`] trait
//! - **Cache**: TTL cache for schema and table-listing lookups
//!
//! The rest of the crate never issues HTTP itself; it consumes
//! [`StoreBackend`] so tests can substitute a stub.

mod cache;
mod client;
mod error;
mod response;
mod schema;

pub use cache::TtlCache;
pub use client::{StoreBackend, StoreClient, StoreClientConfig};
pub use error::{StoreError, StoreResult};
pub use response::{BrokerException, BrokerResponse, DataSchema, DataType, ResultTable};
pub use schema::{DateTimeFieldSpec, FieldSpec, TableSchema};
