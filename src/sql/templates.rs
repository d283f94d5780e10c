//! SQL Templates
//!
//! The four fixed query shapes this service emits. Rendering is byte-exact:
//! two-space indents, one select-list entry per line, each dimension filter
//! on its own `AND` line, and a `SET name=value;` prologue line per valid
//! query option. Tests compare rendered SQL literally, so any change here is
//! a wire-format change.
//!
//! One rule is shared by all templates: the WHERE clause is anchored by the
//! time filter. When no time filter is supplied the WHERE clause is omitted
//! entirely and dimension filters are silently dropped with it. That
//! asymmetry is long-standing observable behavior and is kept on purpose.

use crate::request::{DimensionFilter, OrderByExpr, QueryOption};
use crate::request::{DEFAULT_LISTING_LIMIT, DEFAULT_LOG_LIMIT};

use super::filter::compile_dimension_filter;
use super::quote_ident;

/// Single metric over time, no aggregation
#[derive(Debug, Clone)]
pub struct RawSeriesTemplate<'a> {
    /// Target table
    pub table: &'a str,
    /// Raw time column
    pub time_column: &'a str,
    /// Raw metric column
    pub metric_column: &'a str,
    /// Alias for the time column
    pub time_alias: &'a str,
    /// Alias for the metric column
    pub metric_alias: &'a str,
    /// Rendered time filter, if the query has a range
    pub time_filter: Option<String>,
    /// Structured dimension filters
    pub filters: &'a [DimensionFilter],
    /// SET prologue options
    pub options: &'a [QueryOption],
    /// Row limit (already resolved)
    pub limit: i64,
}

impl RawSeriesTemplate<'_> {
    /// Render the query
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        push_set_lines(&mut lines, self.options);

        lines.push("SELECT".to_string());
        lines.push(format!(
            "  {} AS {},",
            quote_ident(self.time_column),
            quote_ident(self.time_alias)
        ));
        lines.push(format!(
            "  {} AS {}",
            quote_ident(self.metric_column),
            quote_ident(self.metric_alias)
        ));
        lines.push(format!("FROM {}", quote_ident(self.table)));
        push_where_lines(&mut lines, self.time_filter.as_deref(), None, self.filters);
        lines.push(format!("LIMIT {}", self.limit));

        lines.join("\n")
    }
}

/// Grouped time series: aggregation, optional group-by, optional order-by
#[derive(Debug, Clone)]
pub struct GroupedSeriesTemplate<'a> {
    /// Target table
    pub table: &'a str,
    /// Rendered bucketing expression for the select list
    pub time_group_expr: &'a str,
    /// Alias for the bucketed time column
    pub time_alias: &'a str,
    /// Rendered aggregation expression, e.g. `MAX("views")` or `COUNT(*)`
    pub metric_expr: &'a str,
    /// Alias for the aggregated metric
    pub metric_alias: &'a str,
    /// Group-by columns, in order
    pub group_by: &'a [String],
    /// Rendered time filter, if the query has a range
    pub time_filter: Option<String>,
    /// Structured dimension filters
    pub filters: &'a [DimensionFilter],
    /// SET prologue options
    pub options: &'a [QueryOption],
    /// Explicit order-by entries; empty means the default time-descending
    pub order_by: &'a [OrderByExpr],
    /// Row limit (already resolved)
    pub limit: i64,
}

impl GroupedSeriesTemplate<'_> {
    /// Render the query
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        push_set_lines(&mut lines, self.options);

        lines.push("SELECT".to_string());
        lines.push(format!(
            "  {} AS {},",
            self.time_group_expr,
            quote_ident(self.time_alias)
        ));
        for column in self.group_by {
            lines.push(format!("  {},", quote_ident(column)));
        }
        lines.push(format!(
            "  {} AS {}",
            self.metric_expr,
            quote_ident(self.metric_alias)
        ));
        lines.push(format!("FROM {}", quote_ident(self.table)));
        push_where_lines(&mut lines, self.time_filter.as_deref(), None, self.filters);

        let mut group_cols = vec![quote_ident(self.time_alias)];
        group_cols.extend(self.group_by.iter().map(|c| quote_ident(c)));
        lines.push(format!("GROUP BY {}", group_cols.join(", ")));

        let order = if self.order_by.is_empty() {
            format!("{} DESC", quote_ident(self.time_alias))
        } else {
            self.order_by
                .iter()
                .map(|o| format!("{} {}", quote_ident(&o.column), o.direction))
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("ORDER BY {}", order));
        lines.push(format!("LIMIT {}", self.limit));

        lines.join("\n")
    }
}

/// Single or distinct column listing (template variables, ad-hoc values)
#[derive(Debug, Clone)]
pub struct ColumnListingTemplate<'a> {
    /// Target table
    pub table: &'a str,
    /// Column to list
    pub column: &'a str,
    /// Whether to emit `DISTINCT`
    pub distinct: bool,
    /// Rendered time filter, if the listing is range-bounded
    pub time_filter: Option<String>,
    /// Structured dimension filters
    pub filters: &'a [DimensionFilter],
    /// SET prologue options
    pub options: &'a [QueryOption],
    /// Row limit; anything below 1 falls back to the listing default
    pub limit: i64,
}

impl ColumnListingTemplate<'_> {
    /// Render the query
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        push_set_lines(&mut lines, self.options);

        let keyword = if self.distinct { "SELECT DISTINCT" } else { "SELECT" };
        lines.push(format!("{} {}", keyword, quote_ident(self.column)));
        lines.push(format!("FROM {}", quote_ident(self.table)));
        push_where_lines(&mut lines, self.time_filter.as_deref(), None, self.filters);

        let limit = if self.limit >= 1 {
            self.limit
        } else {
            DEFAULT_LISTING_LIMIT
        };
        lines.push(format!("LIMIT {}", limit));

        lines.join("\n")
    }
}

/// Log-style listing: time, message, metadata columns, ascending order
#[derive(Debug, Clone)]
pub struct LogListingTemplate<'a> {
    /// Target table
    pub table: &'a str,
    /// Raw time column
    pub time_column: &'a str,
    /// Message column; rows with a null message are excluded
    pub message_column: &'a str,
    /// Additional metadata columns
    pub metadata_columns: &'a [String],
    /// Rendered time filter, if the query has a range
    pub time_filter: Option<String>,
    /// Structured dimension filters
    pub filters: &'a [DimensionFilter],
    /// SET prologue options
    pub options: &'a [QueryOption],
    /// Row limit; anything below 1 falls back to the log default
    pub limit: i64,
}

impl LogListingTemplate<'_> {
    /// Render the query
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        push_set_lines(&mut lines, self.options);

        lines.push("SELECT".to_string());
        let mut select_cols = vec![
            quote_ident(self.time_column),
            quote_ident(self.message_column),
        ];
        select_cols.extend(self.metadata_columns.iter().map(|c| quote_ident(c)));
        let last = select_cols.len() - 1;
        for (i, col) in select_cols.into_iter().enumerate() {
            let comma = if i == last { "" } else { "," };
            lines.push(format!("  {}{}", col, comma));
        }

        lines.push(format!("FROM {}", quote_ident(self.table)));
        let not_null = format!("{} IS NOT NULL", quote_ident(self.message_column));
        push_where_lines(
            &mut lines,
            self.time_filter.as_deref(),
            Some(&not_null),
            self.filters,
        );

        lines.push(format!(
            "ORDER BY {} ASC, {} ASC",
            quote_ident(self.time_column),
            quote_ident(self.message_column)
        ));

        let limit = if self.limit >= 1 {
            self.limit
        } else {
            DEFAULT_LOG_LIMIT
        };
        lines.push(format!("LIMIT {}", limit));

        lines.join("\n")
    }
}

/// Emit one `SET name=value;` line per option with a non-blank name and value
fn push_set_lines(lines: &mut Vec<String>, options: &[QueryOption]) {
    for option in options {
        let name = option.name.trim();
        let value = option.value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        lines.push(format!("SET {}={};", name, value));
    }
}

/// Emit the WHERE block, or nothing at all without a time filter
fn push_where_lines(
    lines: &mut Vec<String>,
    time_filter: Option<&str>,
    mandatory: Option<&str>,
    filters: &[DimensionFilter],
) {
    let Some(time_filter) = time_filter else {
        return;
    };

    lines.push(format!("WHERE {}", time_filter));
    if let Some(clause) = mandatory {
        lines.push(format!("  AND {}", clause));
    }
    for filter in filters {
        lines.push(format!("  AND {}", compile_dimension_filter(filter)));
    }
}
