//! Variant benchmark runner.
//!
//! Every variant goes through the same three timed phases on its engine's
//! single connection: insert `rows` rows one at a time, point-look-up a
//! sample of at most `lookups` keys, then run the scheme's range query.
//! Any failure aborts the whole run; nothing is retried.

use std::time::Instant;

use tracing::Instrument;

use crate::backends::{Backend, TableStatements};
use crate::config::Workload;
use crate::error::{Error, Phase, Result};
use crate::keys::{payload_for, Key, RangeQuery};
use crate::report::BenchResult;
use crate::schema::{self, BenchTable};

/// Rows between insert progress log lines.
const PROGRESS_CHUNK: i64 = 10_000;

/// Split `[0, total)` into consecutive `[start, end)` chunks of at most
/// `chunk` elements. Empty when either argument is not positive.
pub fn chunk_bounds(total: i64, chunk: i64) -> Vec<[i64; 2]> {
    if total <= 0 || chunk <= 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(((total + chunk - 1) / chunk) as usize);
    let mut start = 0;
    while start < total {
        let end = (start + chunk).min(total);
        out.push([start, end]);
        start = end;
    }
    out
}

/// Lower and upper bound for the integer range query: the keys at the 25th
/// and 75th percentile positions of `sorted_ids`, or `(0, 0)` when empty.
///
/// The window is always half the table; it does not scale with row count.
pub fn range_bounds(sorted_ids: &[i64]) -> (i64, i64) {
    if sorted_ids.is_empty() {
        return (0, 0);
    }
    let len = sorted_ids.len();
    (sorted_ids[len / 4], sorted_ids[(len * 3) / 4])
}

/// Keep the first `lookups` keys. Never repeats or resamples.
pub fn sample_keys(mut keys: Vec<Key>, lookups: usize) -> Vec<Key> {
    keys.truncate(lookups);
    keys
}

fn phase_error(table: &BenchTable, phase: Phase) -> impl FnOnce(sqlx::Error) -> Error {
    let (engine, name) = (table.engine, table.name);
    move |source| Error::Phase {
        engine,
        table: name,
        phase,
        source,
    }
}

/// Verify `backend` answers a trivial round-trip.
pub async fn check_reachable<B: Backend>(backend: &mut B) -> Result<()> {
    let engine = backend.engine();
    backend
        .ping()
        .await
        .map_err(|source| Error::Unreachable { engine, source })?;
    tracing::info!(%engine, "reachable");
    Ok(())
}

/// Run the insert, lookup and range phases for one table.
pub async fn run_variant<B: Backend>(
    backend: &mut B,
    table: &BenchTable,
    workload: Workload,
) -> Result<BenchResult> {
    let span = tracing::info_span!("variant", engine = %table.engine, table = table.name);
    measure(backend, table, workload).instrument(span).await
}

async fn measure<B: Backend>(
    backend: &mut B,
    table: &BenchTable,
    workload: Workload,
) -> Result<BenchResult> {
    let sql = TableStatements::new(table);
    let sample_size = workload.sample_size();

    // Insert: one statement per row, keys kept in generation order.
    let engine_assigned = table.scheme.is_engine_assigned();
    let mut generated = Vec::with_capacity(if engine_assigned { 0 } else { workload.rows });
    let start = Instant::now();
    for [lo, hi] in chunk_bounds(workload.rows as i64, PROGRESS_CHUNK) {
        for index in lo as usize..hi as usize {
            let key = table.scheme.generate();
            backend
                .insert(&sql, key.as_ref(), &payload_for(index))
                .await
                .map_err(phase_error(table, Phase::Insert))?;
            if let Some(key) = key {
                generated.push(key);
            }
        }
        tracing::debug!(inserted = hi, "insert progress");
    }
    let insert_time = start.elapsed();
    tracing::info!(rows = workload.rows, elapsed = ?insert_time, "insert phase done");

    // Sample: auto-increment keys are read back in key order, generated
    // keys are reused from memory.
    let (sample, sorted_ids) = if engine_assigned {
        let ids = backend
            .ordered_auto_keys(&sql)
            .await
            .map_err(phase_error(table, Phase::Sample))?;
        let keys: Vec<Key> = ids
            .iter()
            .take(sample_size)
            .map(|&id| Key::Auto(id))
            .collect();
        (keys, ids)
    } else {
        (sample_keys(generated, sample_size), Vec::new())
    };

    let start = Instant::now();
    for key in &sample {
        backend
            .point_lookup(&sql, key)
            .await
            .map_err(phase_error(table, Phase::Lookup))?;
    }
    let point_time = start.elapsed();
    tracing::info!(lookups = sample.len(), elapsed = ?point_time, "lookup phase done");

    let range_query = table.scheme.range_query();
    let range_time = match range_query {
        RangeQuery::CountBetween => {
            let (lo, hi) = range_bounds(&sorted_ids);
            let start = Instant::now();
            let count = backend
                .count_between(&sql, lo, hi)
                .await
                .map_err(phase_error(table, Phase::Range))?;
            let elapsed = start.elapsed();
            tracing::info!(lo, hi, count, elapsed = ?elapsed, "range count done");
            elapsed
        }
        RangeQuery::OrderedScan { limit } => {
            let start = Instant::now();
            let read = backend
                .ordered_scan(&sql, table.scheme)
                .await
                .map_err(phase_error(table, Phase::Range))?;
            let elapsed = start.elapsed();
            tracing::info!(limit, read, elapsed = ?elapsed, "ordered scan done");
            elapsed
        }
    };

    Ok(BenchResult {
        engine: table.engine,
        table: table.name,
        insert_rows: workload.rows,
        insert_time,
        point_lookups: sample.len(),
        point_time,
        range_time,
        range_query,
    })
}

/// Run every table variant of `backend`'s engine, in catalogue order.
pub async fn run_engine<B: Backend>(
    backend: &mut B,
    workload: Workload,
) -> Result<Vec<BenchResult>> {
    let tables = schema::tables(backend.engine());
    let mut results = Vec::with_capacity(tables.len());
    for table in tables {
        results.push(run_variant(backend, table, workload).await?);
    }
    Ok(results)
}

/// Reset both schemas, then run all five variants: MySQL first, then
/// PostgreSQL. The first error aborts the run and discards earlier results.
pub async fn run_all<M: Backend, P: Backend>(
    mysql: &mut M,
    postgres: &mut P,
    workload: Workload,
) -> Result<Vec<BenchResult>> {
    schema::reset_schema(mysql).await?;
    schema::reset_schema(postgres).await?;

    let mut results = run_engine(mysql, workload).await?;
    results.extend(run_engine(postgres, workload).await?);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::keys::KeyScheme;
    use crate::schema::Engine;

    type SqlResult<T> = std::result::Result<T, sqlx::Error>;

    /// In-memory engine that understands the benchmark's statements.
    struct MemoryBackend {
        engine: Engine,
        tables: HashMap<String, Vec<(Key, String)>>,
        next_id: i64,
        lookups: usize,
        scans: Vec<(String, KeyScheme, i64)>,
        fail_insert_into: Option<&'static str>,
        fail_create: bool,
        unreachable: bool,
    }

    impl MemoryBackend {
        fn new(engine: Engine) -> Self {
            Self {
                engine,
                tables: HashMap::new(),
                next_id: 1,
                lookups: 0,
                scans: Vec::new(),
                fail_insert_into: None,
                fail_create: false,
                unreachable: false,
            }
        }

        fn rows(&self, table: &str) -> usize {
            self.tables.get(table).map_or(0, Vec::len)
        }

        fn table_mut(&mut self, table: &str) -> SqlResult<&mut Vec<(Key, String)>> {
            self.tables
                .get_mut(table)
                .ok_or_else(|| sqlx::Error::Protocol(format!("no such table {table}")))
        }
    }

    impl Backend for MemoryBackend {
        fn engine(&self) -> Engine {
            self.engine
        }

        async fn ping(&mut self) -> SqlResult<()> {
            if self.unreachable {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(())
        }

        async fn execute(&mut self, statement: &str) -> SqlResult<()> {
            if let Some(name) = statement.strip_prefix("DROP TABLE IF EXISTS ") {
                self.tables.remove(name);
            } else if let Some(rest) = statement.strip_prefix("CREATE TABLE ") {
                if self.fail_create {
                    return Err(sqlx::Error::Protocol("create denied".into()));
                }
                let name = rest.split_whitespace().next().unwrap_or_default();
                self.tables.insert(name.to_string(), Vec::new());
            }
            Ok(())
        }

        async fn insert(
            &mut self,
            sql: &TableStatements,
            key: Option<&Key>,
            payload: &str,
        ) -> SqlResult<()> {
            let table = sql.table;
            if self.fail_insert_into == Some(table) {
                return Err(sqlx::Error::Protocol("insert denied".into()));
            }
            let key = match key {
                Some(key) => key.clone(),
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    Key::Auto(id)
                }
            };
            self.table_mut(table)?.push((key, payload.to_string()));
            Ok(())
        }

        async fn ordered_auto_keys(&mut self, sql: &TableStatements) -> SqlResult<Vec<i64>> {
            let mut ids: Vec<i64> = self
                .table_mut(sql.table)?
                .iter()
                .filter_map(|(k, _)| match k {
                    Key::Auto(id) => Some(*id),
                    _ => None,
                })
                .collect();
            ids.sort_unstable();
            Ok(ids)
        }

        async fn point_lookup(&mut self, sql: &TableStatements, key: &Key) -> SqlResult<String> {
            self.lookups += 1;
            self.table_mut(sql.table)?
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, payload)| payload.clone())
                .ok_or(sqlx::Error::RowNotFound)
        }

        async fn count_between(
            &mut self,
            sql: &TableStatements,
            lo: i64,
            hi: i64,
        ) -> SqlResult<i64> {
            let count = self
                .table_mut(sql.table)?
                .iter()
                .filter(|(k, _)| matches!(k, Key::Auto(id) if (lo..=hi).contains(id)))
                .count();
            Ok(count as i64)
        }

        async fn ordered_scan(
            &mut self,
            sql: &TableStatements,
            scheme: KeyScheme,
        ) -> SqlResult<usize> {
            let len = self.table_mut(sql.table)?.len();
            self.scans.push((sql.table.to_string(), scheme, sql.scan_limit));
            Ok(len.min(sql.scan_limit as usize))
        }
    }

    fn workload(rows: usize, lookups: usize) -> Workload {
        Workload { rows, lookups }
    }

    #[test]
    fn test_chunk_bounds() {
        assert_eq!(chunk_bounds(10, 4), vec![[0, 4], [4, 8], [8, 10]]);
        assert_eq!(chunk_bounds(8, 4), vec![[0, 4], [4, 8]]);
        assert_eq!(chunk_bounds(3, 10), vec![[0, 3]]);
    }

    #[test]
    fn test_chunk_bounds_non_positive() {
        assert!(chunk_bounds(0, 4).is_empty());
        assert!(chunk_bounds(-1, 4).is_empty());
        assert!(chunk_bounds(10, 0).is_empty());
        assert!(chunk_bounds(10, -3).is_empty());
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(range_bounds(&[]), (0, 0));
        assert_eq!(range_bounds(&[7]), (7, 7));

        let ids: Vec<i64> = (1..=100).collect();
        assert_eq!(range_bounds(&ids), (26, 76));

        let ids: Vec<i64> = (1..=10).collect();
        assert_eq!(range_bounds(&ids), (3, 8));
    }

    #[test]
    fn test_sample_keys_truncates_without_repeating() {
        let keys: Vec<Key> = (1..=5).map(Key::Auto).collect();
        assert_eq!(sample_keys(keys.clone(), 3), keys[..3].to_vec());
        assert_eq!(sample_keys(keys.clone(), 50), keys);
    }

    #[tokio::test]
    async fn test_run_all_produces_five_results_in_order() {
        let mut mysql = MemoryBackend::new(Engine::MySql);
        let mut postgres = MemoryBackend::new(Engine::Postgres);

        let results = run_all(&mut mysql, &mut postgres, workload(100, 50))
            .await
            .unwrap();

        let order: Vec<_> = results.iter().map(|r| (r.engine, r.table)).collect();
        assert_eq!(
            order,
            vec![
                (Engine::MySql, "bench_auto"),
                (Engine::MySql, "bench_uuid_char"),
                (Engine::MySql, "bench_uuid_bin"),
                (Engine::Postgres, "bench_auto"),
                (Engine::Postgres, "bench_uuid"),
            ]
        );
        for r in &results {
            assert_eq!(r.insert_rows, 100);
            assert_eq!(r.point_lookups, 50);
        }
        assert_eq!(mysql.lookups, 150);
        assert_eq!(postgres.lookups, 100);
        assert_eq!(mysql.rows("bench_uuid_bin"), 100);
        assert_eq!(postgres.rows("bench_uuid"), 100);
    }

    #[tokio::test]
    async fn test_lookups_capped_by_rows() {
        let mut mysql = MemoryBackend::new(Engine::MySql);
        let mut postgres = MemoryBackend::new(Engine::Postgres);

        let capped = workload(10, 1_000);
        let results = run_all(&mut mysql, &mut postgres, capped).await.unwrap();

        assert_eq!(results.len(), 5);
        for r in &results {
            assert_eq!(r.point_lookups, capped.sample_size());
            assert!(r.point_lookups <= r.insert_rows);
        }
        assert_eq!(mysql.lookups, 3 * capped.sample_size());
        assert_eq!(postgres.lookups, 2 * capped.sample_size());
    }

    #[tokio::test]
    async fn test_range_query_follows_scheme() {
        let mut backend = MemoryBackend::new(Engine::MySql);
        schema::reset_schema(&mut backend).await.unwrap();

        let results = run_engine(&mut backend, workload(20, 5)).await.unwrap();
        assert_eq!(results[0].range_query, RangeQuery::CountBetween);
        assert_eq!(
            results[1].range_query,
            RangeQuery::OrderedScan { limit: 10_000 }
        );
        assert_eq!(
            backend.scans,
            vec![
                ("bench_uuid_char".to_string(), KeyScheme::UuidText, 10_000),
                ("bench_uuid_bin".to_string(), KeyScheme::UuidBinary, 10_000),
            ]
        );
    }

    #[tokio::test]
    async fn test_payloads_follow_row_index() {
        let mut backend = MemoryBackend::new(Engine::Postgres);
        schema::reset_schema(&mut backend).await.unwrap();
        run_engine(&mut backend, workload(3, 3)).await.unwrap();

        let payloads: Vec<_> = backend.tables["bench_uuid"]
            .iter()
            .map(|(_, p)| p.as_str())
            .collect();
        assert_eq!(payloads, vec!["p-0", "p-1", "p-2"]);
    }

    #[tokio::test]
    async fn test_insert_failure_aborts_remaining_variants() {
        let mut mysql = MemoryBackend::new(Engine::MySql);
        mysql.fail_insert_into = Some("bench_uuid_bin");
        let mut postgres = MemoryBackend::new(Engine::Postgres);

        let err = run_all(&mut mysql, &mut postgres, workload(10, 5))
            .await
            .unwrap_err();

        match err {
            Error::Phase {
                engine,
                table,
                phase,
                ..
            } => {
                assert_eq!(engine, Engine::MySql);
                assert_eq!(table, "bench_uuid_bin");
                assert_eq!(phase, Phase::Insert);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(postgres.rows("bench_auto"), 0);
        assert_eq!(postgres.rows("bench_uuid"), 0);
    }

    #[tokio::test]
    async fn test_schema_failure_names_engine() {
        let mut mysql = MemoryBackend::new(Engine::MySql);
        let mut postgres = MemoryBackend::new(Engine::Postgres);
        postgres.fail_create = true;

        let err = run_all(&mut mysql, &mut postgres, workload(10, 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema {
                engine: Engine::Postgres,
                ..
            }
        ));
        assert_eq!(mysql.rows("bench_auto"), 0);
    }

    #[tokio::test]
    async fn test_check_reachable() {
        let mut backend = MemoryBackend::new(Engine::MySql);
        check_reachable(&mut backend).await.unwrap();

        backend.unreachable = true;
        let err = check_reachable(&mut backend).await.unwrap_err();
        assert!(err.to_string().starts_with("mysql ping failed"));
    }
}
