//! Long-to-Wide Pivot
//!
//! Grouped queries come back long-form: one row per (timestamp, label set)
//! with a single value column. Time-series display wants wide form: one
//! column per distinct series over a shared time domain. The pivot keeps
//! the order the store returned: timestamps enter the domain in first-seen
//! order and series columns appear in first-seen order, so the upstream
//! query's ORDER BY remains visible in the output.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::{Field, FieldValues, Frame};

/// One long-form observation
///
/// Labels live in a `BTreeMap` so series names render with keys in a stable
/// ascending order regardless of extraction order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesMetric {
    /// When the observation happened
    pub timestamp: DateTime<Utc>,
    /// Observed value
    pub value: f64,
    /// Dimension labels identifying the series
    pub labels: BTreeMap<String, String>,
}

impl TimeSeriesMetric {
    /// Create an unlabeled observation
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            labels: BTreeMap::new(),
        }
    }

    /// Attach a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The series this observation belongs to
    ///
    /// The bare metric name for an unlabeled observation, otherwise
    /// `metric{k1=v1,k2=v2}` with keys ascending.
    pub fn series_name(&self, metric_name: &str) -> String {
        if self.labels.is_empty() {
            return metric_name.to_string();
        }
        let pairs = self
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}{{{}}}", metric_name, pairs)
    }
}

/// Reshape long-form observations into a wide frame
///
/// One `NullableDouble` field per distinct series plus a trailing `Time`
/// field. Cells with no observation stay `None`; a repeated (series,
/// timestamp) pair keeps the later value.
pub fn pivot(metric_name: &str, time_name: &str, observations: &[TimeSeriesMetric]) -> Frame {
    let mut domain: Vec<DateTime<Utc>> = Vec::new();
    let mut domain_index: HashMap<DateTime<Utc>, usize> = HashMap::new();
    let mut series_order: Vec<String> = Vec::new();
    let mut columns: HashMap<String, Vec<Option<f64>>> = HashMap::new();

    for obs in observations {
        let slot = match domain_index.get(&obs.timestamp) {
            Some(&i) => i,
            None => {
                let i = domain.len();
                domain.push(obs.timestamp);
                domain_index.insert(obs.timestamp, i);
                i
            }
        };

        let name = obs.series_name(metric_name);
        if !columns.contains_key(&name) {
            series_order.push(name.clone());
        }
        let column = columns.entry(name).or_default();
        if column.len() <= slot {
            column.resize(slot + 1, None);
        }
        column[slot] = Some(obs.value);
    }

    let mut frame = Frame::new(metric_name);
    for name in series_order {
        let mut column = columns.remove(&name).unwrap_or_default();
        column.resize(domain.len(), None);
        frame.push_field(Field::new(name, FieldValues::NullableDouble(column)));
    }
    frame.push_field(Field::new(time_name, FieldValues::Time(domain)));
    frame
}
