//! Result records and their CSV rendering.
//!
//! The `range_or_orderby_sec` column mixes two different measurements: a
//! bounded `COUNT(*)` for auto-increment tables and a capped ordered scan
//! for UUID tables (see [`RangeQuery`]). Compare it only between rows with
//! the same range query.

use std::time::Duration;

use crate::keys::RangeQuery;
use crate::schema::Engine;

/// Banner printed above the CSV header.
pub const BANNER: &str = "=== Benchmark Results ===";

/// CSV header, in column order.
pub const CSV_HEADER: &str =
    "db,table,insert_rows,insert_sec,point_lookups,point_sec,range_or_orderby_sec";

/// Measurements for one (engine, table) variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub engine: Engine,
    pub table: &'static str,
    pub insert_rows: usize,
    pub insert_time: Duration,
    pub point_lookups: usize,
    pub point_time: Duration,
    pub range_time: Duration,
    pub range_query: RangeQuery,
}

impl BenchResult {
    /// One CSV data line, without a trailing newline.
    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{:.6},{},{:.6},{:.6}",
            self.engine,
            self.table,
            self.insert_rows,
            self.insert_time.as_secs_f64(),
            self.point_lookups,
            self.point_time.as_secs_f64(),
            self.range_time.as_secs_f64(),
        )
    }
}

/// Render results as banner, header and one line per record.
pub fn format_results(results: &[BenchResult]) -> String {
    let mut out = String::new();
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(CSV_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&result.csv_line());
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Insert-time statistics for one engine across its variants.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSummary {
    pub engine: Engine,
    pub variants: usize,
    /// Mean insert time in seconds.
    pub insert_mean: f64,
    /// Population standard deviation of insert time in seconds.
    pub insert_stddev: f64,
}

/// Per-engine insert mean/stddev, in first-seen engine order.
pub fn summarize(results: &[BenchResult]) -> Vec<EngineSummary> {
    let mut engines: Vec<Engine> = Vec::new();
    for result in results {
        if !engines.contains(&result.engine) {
            engines.push(result.engine);
        }
    }

    engines
        .into_iter()
        .map(|engine| {
            let samples: Vec<f64> = results
                .iter()
                .filter(|r| r.engine == engine)
                .map(|r| r.insert_time.as_secs_f64())
                .collect();
            let n = samples.len() as f64;
            let mean = samples.iter().sum::<f64>() / n;
            let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
            EngineSummary {
                engine,
                variants: samples.len(),
                insert_mean: mean,
                insert_stddev: variance.sqrt(),
            }
        })
        .collect()
}

/// Render summaries as `<engine>: insert mean=...s stddev=...s` lines.
pub fn format_summary(summaries: &[EngineSummary]) -> String {
    summaries
        .iter()
        .map(|s| {
            format!(
                "{}: insert mean={:.6}s stddev={:.6}s",
                s.engine, s.insert_mean, s.insert_stddev
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
