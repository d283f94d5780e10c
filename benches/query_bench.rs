//! Benchmarks for Trellis query compilation and result shaping
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;

use trellis::frame::{extract_series_frame, pivot, TimeSeriesMetric};
use trellis::request::{DimensionFilter, TimeRange};
use trellis::sql::{GroupedSeriesTemplate, MacroEngine, TimeExprFormat};
use trellis::store::{DataSchema, ResultTable, TableSchema};

const REGIONS: [&str; 5] = ["us", "eu", "apac", "latam", "mea"];

fn sample_schema() -> TableSchema {
    serde_json::from_value(serde_json::json!({
        "schemaName": "pageviews",
        "dimensionFieldSpecs": [
            {"name": "country", "dataType": "STRING"},
            {"name": "browser", "dataType": "STRING"}
        ],
        "metricFieldSpecs": [{"name": "views", "dataType": "LONG"}],
        "dateTimeFieldSpecs": [{
            "name": "ts",
            "dataType": "LONG",
            "format": "1:MILLISECONDS:EPOCH",
            "granularity": "1:MILLISECONDS"
        }]
    }))
    .unwrap()
}

fn series_table(rows: usize) -> ResultTable {
    ResultTable {
        data_schema: DataSchema {
            column_names: vec![
                "time".to_string(),
                "metric".to_string(),
                "region".to_string(),
            ],
            column_data_types: vec![
                "LONG".to_string(),
                "DOUBLE".to_string(),
                "STRING".to_string(),
            ],
        },
        rows: (0..rows)
            .map(|i| {
                vec![
                    serde_json::json!((i as i64 / 5) * 60_000),
                    serde_json::json!(i as f64),
                    serde_json::json!(REGIONS[i % REGIONS.len()]),
                ]
            })
            .collect(),
    }
}

fn bench_macro_expansion(c: &mut Criterion) {
    let schema = sample_schema();
    let range = TimeRange::from_epoch_millis(1388534400000, 1391212800000);
    let engine = MacroEngine::new(
        "pageviews",
        &schema,
        &range,
        Duration::from_secs(3600),
        "time",
        "metric",
    );

    let code = "SELECT $__timeGroup(ts) AS $__timeAlias(), COUNT(*) AS $__metricAlias()\n\
                FROM $__table()\n\
                WHERE $__timeFilter(ts)\n\
                GROUP BY $__timeAlias()\n\
                ORDER BY $__timeAlias() DESC\n\
                LIMIT 100000";

    c.bench_function("macro_expand", |b| {
        b.iter(|| engine.expand(black_box(code)).unwrap())
    });

    let plain = "SELECT ts, views FROM pageviews WHERE country = 'US' LIMIT 1000";

    c.bench_function("macro_expand_no_macros", |b| {
        b.iter(|| engine.expand(black_box(plain)).unwrap())
    });
}

fn bench_template_render(c: &mut Criterion) {
    let filters = vec![
        DimensionFilter::new("country", "=", vec!["'US'".to_string(), "'DE'".to_string()]),
        DimensionFilter::new("browser", "contains", vec!["'fire'".to_string()]),
    ];
    let group_by = vec!["country".to_string(), "browser".to_string()];
    let time_filter = "\"ts\" >= 1388534400000 AND \"ts\" <= 1391212800000".to_string();

    c.bench_function("grouped_template_render", |b| {
        b.iter(|| {
            GroupedSeriesTemplate {
                table: "pageviews",
                time_group_expr: "DATETIMECONVERT(\"ts\", '1:MILLISECONDS:EPOCH', '1:MILLISECONDS:EPOCH', '1:HOURS')",
                time_alias: "time",
                metric_expr: "SUM(\"views\")",
                metric_alias: "metric",
                group_by: black_box(&group_by),
                time_filter: Some(time_filter.clone()),
                filters: black_box(&filters),
                options: &[],
                order_by: &[],
                limit: 100_000,
            }
            .render()
        })
    });
}

fn bench_pivot(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot");

    for size in [100, 1000, 10000] {
        let observations: Vec<TimeSeriesMetric> = (0..size)
            .map(|i| {
                let ts = Utc
                    .timestamp_millis_opt((i as i64 / 5) * 60_000)
                    .single()
                    .unwrap();
                TimeSeriesMetric::new(ts, i as f64).with_label("region", REGIONS[i % REGIONS.len()])
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("pivot_{}", size), |b| {
            b.iter(|| pivot(black_box("metric"), black_box("time"), black_box(&observations)))
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for size in [1000, 10000] {
        let table = series_table(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("series_frame_{}", size), |b| {
            b.iter(|| {
                extract_series_frame(
                    black_box(&table),
                    &TimeExprFormat::millis(),
                    "time",
                    "metric",
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_macro_expansion,
    bench_template_render,
    bench_pivot,
    bench_extract
);
criterion_main!(benches);
