//! Builder-Mode Driver
//!
//! Compiles the structured editor fields into one of the two series
//! templates. All validation happens at construction so a driver that
//! exists can always render; the only later failures are result-shape
//! mismatches during extraction.

use std::time::Duration;

use crate::frame::{extract_series_frame, ExtractResult, Frame};
use crate::request::{
    Aggregation, DimensionFilter, OrderByExpr, QueryContext, QueryOption, QueryRequest, TimeRange,
    DEFAULT_QUERY_LIMIT,
};
use crate::sql::{
    granularity, quote_ident, GroupedSeriesTemplate, RawSeriesTemplate, SqlError, SqlResult,
    TimeExprFormat, TimeExpressionBuilder,
};
use crate::store::{ResultTable, TableSchema};

/// A validated builder-mode query, ready to render and extract
#[derive(Debug, Clone)]
pub struct BuilderDriver {
    table: String,
    time_expr: TimeExpressionBuilder,
    metric_column: String,
    aggregation: Aggregation,
    group_by: Vec<String>,
    filters: Vec<DimensionFilter>,
    order_by: Vec<OrderByExpr>,
    options: Vec<QueryOption>,
    time_range: TimeRange,
    bucket: Duration,
    limit: i64,
    time_alias: String,
    metric_alias: String,
}

impl BuilderDriver {
    /// Validate a query description and resolve everything it needs
    ///
    /// Field checks run in a fixed order so error messages are stable:
    /// time column, metric column, aggregation, granularity, then the time
    /// column's schema format.
    pub fn new(
        query: &QueryRequest,
        ctx: &QueryContext,
        schema: &TableSchema,
    ) -> SqlResult<Self> {
        if query.time_column.trim().is_empty() {
            return Err(SqlError::Configuration(
                "time column is required".to_string(),
            ));
        }

        // COUNT is the one aggregation that needs no metric column
        let counts_rows = query.aggregation.trim().eq_ignore_ascii_case("COUNT");
        if query.metric_column.trim().is_empty() && !counts_rows {
            return Err(SqlError::Configuration(
                "metric column is required".to_string(),
            ));
        }

        if query.aggregation.trim().is_empty() {
            return Err(SqlError::Configuration("aggregation is required".to_string()));
        }
        let aggregation = Aggregation::from_str(query.aggregation.trim()).ok_or_else(|| {
            SqlError::Configuration(format!("unknown aggregation: {}", query.aggregation.trim()))
        })?;

        let bucket = if granularity::is_auto(&query.granularity) {
            ctx.interval
        } else {
            granularity::parse(&query.granularity)?
        };

        let time_expr = TimeExpressionBuilder::new(schema, query.time_column.trim())?;

        Ok(Self {
            table: query.table.trim().to_string(),
            time_expr,
            metric_column: query.metric_column.trim().to_string(),
            aggregation,
            group_by: query.group_by_columns.clone(),
            filters: query.dimension_filters.clone(),
            order_by: query.order_by.clone(),
            options: query.query_options.clone(),
            time_range: ctx.time_range,
            bucket,
            limit: resolve_limit(query, ctx, aggregation),
            time_alias: query.time_alias().to_string(),
            metric_alias: query.metric_alias().to_string(),
        })
    }

    /// The resolved row limit
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// The resolved bucket size
    pub fn bucket(&self) -> Duration {
        self.bucket
    }

    /// Render the SQL for this query
    ///
    /// Aggregation NONE renders the raw two-column select; everything else
    /// renders the grouped shape with a bucketing expression.
    pub fn render_sql(&self) -> SqlResult<String> {
        let time_filter = Some(self.time_expr.time_filter_expr(&self.time_range));

        if !self.aggregation.is_aggregating() {
            return Ok(RawSeriesTemplate {
                table: &self.table,
                time_column: self.time_expr.column(),
                metric_column: &self.metric_column,
                time_alias: &self.time_alias,
                metric_alias: &self.metric_alias,
                time_filter,
                filters: &self.filters,
                options: &self.options,
                limit: self.limit,
            }
            .render());
        }

        let metric_expr = match self.aggregation {
            Aggregation::Count => "COUNT(*)".to_string(),
            agg => format!("{}({})", agg, quote_ident(&self.metric_column)),
        };

        Ok(GroupedSeriesTemplate {
            table: &self.table,
            time_group_expr: &self.time_expr.time_group_expr(self.bucket),
            time_alias: &self.time_alias,
            metric_expr: &metric_expr,
            metric_alias: &self.metric_alias,
            group_by: &self.group_by,
            time_filter,
            filters: &self.filters,
            options: &self.options,
            order_by: &self.order_by,
            limit: self.limit,
        }
        .render())
    }

    /// Pivot results into a wide time-series frame
    ///
    /// Grouped queries always come back with the time column in epoch
    /// milliseconds (the bucketing expression's output format); raw queries
    /// keep the column's declared format.
    pub fn extract_results(&self, table: &ResultTable) -> ExtractResult<Frame> {
        let format = if self.aggregation.is_aggregating() {
            TimeExprFormat::millis()
        } else {
            self.time_expr.format().clone()
        };
        extract_series_frame(table, &format, &self.time_alias, &self.metric_alias)
    }
}

/// Resolve the row limit from the explicit field, the query shape, and the
/// panel's hint
fn resolve_limit(query: &QueryRequest, ctx: &QueryContext, aggregation: Aggregation) -> i64 {
    if query.limit >= 1 {
        return query.limit;
    }
    if aggregation.is_aggregating() && !query.group_by_columns.is_empty() {
        return DEFAULT_QUERY_LIMIT;
    }
    if let Some(points) = ctx.max_data_points.filter(|&p| p >= 1) {
        return points;
    }
    DEFAULT_QUERY_LIMIT
}
