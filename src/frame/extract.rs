//! Typed Column Extraction
//!
//! Reads store result columns into [`FieldValues`] by their declared type.
//! The store's declared types are advisory, so every read goes through the
//! loose per-cell coercions on [`ResultTable`] and falls back to a zero
//! value rather than failing a whole query over one odd cell. Time columns
//! are the exception: a time cell that does not parse aborts the extraction,
//! since a frame with misaligned timestamps is worse than no frame.

use chrono::{DateTime, Utc};

use crate::sql::TimeExprFormat;
use crate::store::{DataType, ResultTable};

use super::error::{ExtractError, ExtractResult};
use super::pivot::{pivot, TimeSeriesMetric};
use super::{Field, FieldValues, Frame};

/// Find a column by exact name
pub fn column_index(table: &ResultTable, name: &str) -> ExtractResult<usize> {
    table
        .data_schema
        .column_names
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| ExtractError::ColumnNotFound(name.to_string()))
}

/// Extract one column as typed values
///
/// INT and LONG read as 64-bit integers, FLOAT and DOUBLE as 64-bit floats,
/// STRING as text. Any other declared type yields a zero-filled integer
/// column and a warning; unknown types are degraded, never fatal.
pub fn extract_column(table: &ResultTable, idx: usize) -> FieldValues {
    let rows = table.row_count();
    match table.column_type(idx) {
        DataType::Int | DataType::Long => FieldValues::Long(
            (0..rows)
                .map(|row| table.long_value(row, idx).unwrap_or(0))
                .collect(),
        ),
        DataType::Float | DataType::Double => FieldValues::Double(
            (0..rows)
                .map(|row| table.double_value(row, idx).unwrap_or(0.0))
                .collect(),
        ),
        DataType::String => FieldValues::String(
            (0..rows)
                .map(|row| table.string_value(row, idx).unwrap_or_default())
                .collect(),
        ),
        DataType::Other => {
            tracing::warn!(
                column = table.column_name(idx).unwrap_or(""),
                declared_type = table.column_type_name(idx),
                "unsupported column type, emitting zeros"
            );
            FieldValues::Long(vec![0; rows])
        }
    }
}

/// Extract one column as ready-to-embed SQL literal expressions
///
/// Numeric cells render bare, strings render single-quoted with embedded
/// quotes doubled. Unknown types render `0`, mirroring [`extract_column`].
pub fn extract_literal_exprs(table: &ResultTable, idx: usize) -> Vec<String> {
    let rows = table.row_count();
    match table.column_type(idx) {
        DataType::Int | DataType::Long => (0..rows)
            .map(|row| table.long_value(row, idx).unwrap_or(0).to_string())
            .collect(),
        DataType::Float | DataType::Double => (0..rows)
            .map(|row| table.double_value(row, idx).unwrap_or(0.0).to_string())
            .collect(),
        DataType::String => (0..rows)
            .map(|row| {
                let s = table.string_value(row, idx).unwrap_or_default();
                format!("'{}'", s.replace('\'', "''"))
            })
            .collect(),
        DataType::Other => (0..rows).map(|_| "0".to_string()).collect(),
    }
}

/// Extract one column as UTC instants in the given time format
///
/// Date-pattern formats parse each cell as text; every other format reads
/// each cell as an integer count at the format's unit. The first
/// unparseable cell fails the whole column.
pub fn extract_time_column(
    table: &ResultTable,
    idx: usize,
    format: &TimeExprFormat,
) -> ExtractResult<Vec<DateTime<Utc>>> {
    let column = table.column_name(idx).unwrap_or("").to_string();
    let mut out = Vec::with_capacity(table.row_count());

    for row in 0..table.row_count() {
        let instant = if format.is_text() {
            table
                .string_value(row, idx)
                .and_then(|text| format.decode_text(&text))
        } else {
            table
                .long_value(row, idx)
                .and_then(|count| format.decode_count(count))
        };

        match instant {
            Some(t) => out.push(t),
            None => {
                return Err(ExtractError::TimeParse {
                    column,
                    value: cell_display(table, row, idx),
                })
            }
        }
    }

    Ok(out)
}

/// Assemble a table frame: optional leading time field, then every other
/// column by declared type
///
/// Shared by code-mode TABLE display and the log listing. The time column
/// is included only when a column with that name exists in the results;
/// listings without one still produce a frame.
pub fn extract_table_frame(
    table: &ResultTable,
    time_format: &TimeExprFormat,
    time_column: &str,
) -> ExtractResult<Frame> {
    let mut frame = Frame::default();

    let time_idx = column_index(table, time_column).ok();
    if let Some(idx) = time_idx {
        let instants = extract_time_column(table, idx, time_format)?;
        frame.push_field(Field::new(time_column, FieldValues::Time(instants)));
    }

    for idx in 0..table.column_count() {
        if Some(idx) == time_idx {
            continue;
        }
        let name = table.column_name(idx).unwrap_or("").to_string();
        frame.push_field(Field::new(name, extract_column(table, idx)));
    }

    Ok(frame)
}

/// Assemble a pivoted time-series frame keyed by the time and metric columns
///
/// Decodes the time column in the given format, reads the metric column as
/// floats, treats every remaining column as a label, then pivots long to
/// wide. Both named columns must exist in the results.
pub fn extract_series_frame(
    table: &ResultTable,
    time_format: &TimeExprFormat,
    time_name: &str,
    metric_name: &str,
) -> ExtractResult<Frame> {
    let time_idx = column_index(table, time_name)?;
    let metric_idx = column_index(table, metric_name)?;
    let instants = extract_time_column(table, time_idx, time_format)?;

    let mut observations = Vec::with_capacity(table.row_count());
    for (row, &timestamp) in instants.iter().enumerate() {
        let value = table.double_value(row, metric_idx).unwrap_or(0.0);
        let mut obs = TimeSeriesMetric::new(timestamp, value);
        for col in 0..table.column_count() {
            if col == time_idx || col == metric_idx {
                continue;
            }
            let key = table.column_name(col).unwrap_or("").to_string();
            let label = table.string_value(row, col).unwrap_or_default();
            obs.labels.insert(key, label);
        }
        observations.push(obs);
    }

    Ok(pivot(metric_name, time_name, &observations))
}

fn cell_display(table: &ResultTable, row: usize, col: usize) -> String {
    table
        .string_value(row, col)
        .or_else(|| table.cell(row, col).map(|v| v.to_string()))
        .unwrap_or_else(|| "null".to_string())
}
