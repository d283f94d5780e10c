//! Code-Mode Driver
//!
//! Runs the macro engine over raw editor SQL. The driver owns a schema
//! snapshot so macro expansion and extraction work from the same view of
//! the table, even if the cached schema rotates mid-flight.

use std::time::Duration;

use crate::frame::{extract_series_frame, extract_table_frame, ExtractResult, Frame};
use crate::request::{DisplayType, QueryContext, QueryRequest, TimeRange};
use crate::sql::{granularity, MacroEngine, SqlError, SqlResult, TimeExprFormat};
use crate::store::{ResultTable, TableSchema};

/// A validated code-mode query, ready to expand and extract
#[derive(Debug, Clone)]
pub struct CodeDriver {
    table: String,
    schema: TableSchema,
    code: String,
    display_type: DisplayType,
    time_range: TimeRange,
    bucket: Duration,
    time_alias: String,
    metric_alias: String,
    output_format: TimeExprFormat,
}

impl CodeDriver {
    /// Validate a code query and resolve its declared output time format
    pub fn new(
        query: &QueryRequest,
        ctx: &QueryContext,
        schema: &TableSchema,
    ) -> SqlResult<Self> {
        if query.table.trim().is_empty() {
            return Err(SqlError::Configuration("table is required".to_string()));
        }
        if ctx.interval.is_zero() {
            return Err(SqlError::Configuration("interval is required".to_string()));
        }
        if query.code.trim().is_empty() {
            return Err(SqlError::Configuration("query code is required".to_string()));
        }

        let bucket = if granularity::is_auto(&query.granularity) {
            ctx.interval
        } else {
            granularity::parse(&query.granularity)?
        };

        Ok(Self {
            table: query.table.trim().to_string(),
            schema: schema.clone(),
            code: query.code.clone(),
            display_type: query.display_type,
            time_range: ctx.time_range,
            bucket,
            time_alias: query.time_alias().to_string(),
            metric_alias: query.metric_alias().to_string(),
            output_format: TimeExprFormat::resolve(query.time_format())?,
        })
    }

    /// The resolved bucket size
    pub fn bucket(&self) -> Duration {
        self.bucket
    }

    /// Expand every macro in the raw code
    pub fn render_sql(&self) -> SqlResult<String> {
        MacroEngine::new(
            &self.table,
            &self.schema,
            &self.time_range,
            self.bucket,
            &self.time_alias,
            &self.metric_alias,
        )
        .expand(&self.code)
    }

    /// Shape results per the query's display type
    ///
    /// TABLE keeps the store's columns (time first when present);
    /// TIMESERIES pivots on the time and metric aliases.
    pub fn extract_results(&self, table: &ResultTable) -> ExtractResult<Frame> {
        match self.display_type {
            DisplayType::Table => {
                extract_table_frame(table, &self.output_format, &self.time_alias)
            }
            DisplayType::TimeSeries => extract_series_frame(
                table,
                &self.output_format,
                &self.time_alias,
                &self.metric_alias,
            ),
        }
    }
}
