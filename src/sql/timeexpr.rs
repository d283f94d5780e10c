//! Time Expression Builder
//!
//! Builds the two time-related SQL fragments every dashboard query needs:
//! the inclusive range filter on the raw time column and the bucketing
//! expression that converts the column to epoch milliseconds truncated to a
//! granularity. Both are driven by the column's declared format, so the same
//! query description works over epoch, timestamp, and date-pattern columns.

use std::time::Duration;

use crate::request::TimeRange;
use crate::store::TableSchema;

use super::error::{SqlError, SqlResult};
use super::granularity;
use super::quote_ident;
use super::timefmt::TimeExprFormat;

/// Output format of every bucketing expression; grouped results always
/// decode as epoch milliseconds regardless of the column's own format
pub const OUTPUT_FORMAT_MILLIS: &str = "1:MILLISECONDS:EPOCH";

/// Renders time-filter and time-bucket SQL fragments for one time column
#[derive(Debug, Clone, PartialEq)]
pub struct TimeExpressionBuilder {
    column: String,
    format: TimeExprFormat,
}

impl TimeExpressionBuilder {
    /// Resolve a time column against a schema snapshot
    ///
    /// Fails when the column is not declared as a date-time field or its
    /// declared format is not in the catalog.
    pub fn new(schema: &TableSchema, time_column: &str) -> SqlResult<Self> {
        let field = schema
            .date_time_field(time_column)
            .ok_or_else(|| SqlError::ColumnNotFound(time_column.to_string()))?;
        let format = TimeExprFormat::resolve(&field.format)?;
        Ok(Self {
            column: time_column.to_string(),
            format,
        })
    }

    /// Build directly from a column name and an already-resolved format
    pub fn from_format(time_column: impl Into<String>, format: TimeExprFormat) -> Self {
        Self {
            column: time_column.into(),
            format,
        }
    }

    /// The column this builder renders expressions for
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The column's resolved format
    pub fn format(&self) -> &TimeExprFormat {
        &self.format
    }

    /// Inclusive range filter on the raw column
    ///
    /// Both bounds are encoded in the column's own format, so the predicate
    /// stays index-friendly on the store side.
    pub fn time_filter_expr(&self, range: &TimeRange) -> String {
        let col = quote_ident(&self.column);
        format!(
            "{} >= {} AND {} <= {}",
            col,
            self.format.encode(range.from),
            col,
            self.format.encode(range.to)
        )
    }

    /// Bucketing expression: the column converted to epoch milliseconds and
    /// truncated to the bucket size
    pub fn time_group_expr(&self, bucket: Duration) -> String {
        format!(
            "DATETIMECONVERT({}, '{}', '{}', '{}')",
            quote_ident(&self.column),
            self.format.input_format(),
            OUTPUT_FORMAT_MILLIS,
            granularity::render(bucket)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DateTimeFieldSpec, TableSchema};

    fn schema_with(format: &str) -> TableSchema {
        TableSchema {
            schema_name: "pageviews".to_string(),
            date_time_field_specs: vec![DateTimeFieldSpec {
                name: "ts".to_string(),
                data_type: "LONG".to_string(),
                format: format.to_string(),
                granularity: "1:MILLISECONDS".to_string(),
            }],
            ..Default::default()
        }
    }

    fn january_2014() -> TimeRange {
        TimeRange::from_epoch_millis(1388534400000, 1391212800000)
    }

    #[test]
    fn test_millis_time_filter() {
        let builder =
            TimeExpressionBuilder::new(&schema_with("1:MILLISECONDS:EPOCH"), "ts").unwrap();

        assert_eq!(
            builder.time_filter_expr(&january_2014()),
            r#""ts" >= 1388534400000 AND "ts" <= 1391212800000"#
        );
    }

    #[test]
    fn test_seconds_time_filter() {
        let builder = TimeExpressionBuilder::new(&schema_with("1:SECONDS:EPOCH"), "ts").unwrap();

        assert_eq!(
            builder.time_filter_expr(&january_2014()),
            r#""ts" >= 1388534400 AND "ts" <= 1391212800"#
        );
    }

    #[test]
    fn test_date_pattern_time_filter() {
        let builder =
            TimeExpressionBuilder::new(&schema_with("SIMPLE_DATE_FORMAT:yyyy-MM-dd"), "ts")
                .unwrap();

        assert_eq!(
            builder.time_filter_expr(&january_2014()),
            r#""ts" >= '2014-01-01' AND "ts" <= '2014-02-01'"#
        );
    }

    #[test]
    fn test_time_group_expr() {
        let builder =
            TimeExpressionBuilder::new(&schema_with("1:MILLISECONDS:EPOCH"), "ts").unwrap();

        assert_eq!(
            builder.time_group_expr(Duration::from_secs(3600)),
            r#"DATETIMECONVERT("ts", '1:MILLISECONDS:EPOCH', '1:MILLISECONDS:EPOCH', '1:HOURS')"#
        );
    }

    #[test]
    fn test_time_group_expr_other_formats() {
        let secs = TimeExpressionBuilder::new(&schema_with("EPOCH|SECONDS|1"), "ts").unwrap();
        assert_eq!(
            secs.time_group_expr(Duration::from_secs(900)),
            r#"DATETIMECONVERT("ts", '1:SECONDS:EPOCH', '1:MILLISECONDS:EPOCH', '15:MINUTES')"#
        );

        let sdf = TimeExpressionBuilder::new(&schema_with("SIMPLE_DATE_FORMAT:yyyyMMdd"), "ts")
            .unwrap();
        assert_eq!(
            sdf.time_group_expr(Duration::from_secs(86400)),
            r#"DATETIMECONVERT("ts", '1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd', '1:MILLISECONDS:EPOCH', '24:HOURS')"#
        );
    }

    #[test]
    fn test_unknown_column_fails() {
        let err = TimeExpressionBuilder::new(&schema_with("1:MILLISECONDS:EPOCH"), "created_at")
            .unwrap_err();
        assert!(matches!(err, SqlError::ColumnNotFound(col) if col == "created_at"));
    }

    #[test]
    fn test_unsupported_format_fails() {
        let err = TimeExpressionBuilder::new(&schema_with("2:WEEKS:EPOCH"), "ts").unwrap_err();
        assert!(matches!(err, SqlError::UnsupportedFormat(_)));
    }
}
