//! Database backends for the key benchmarks.
//!
//! This module provides a common interface over MySQL and PostgreSQL so the
//! runner can drive every variant through one routine. Each backend owns a
//! single driver connection (no pool) that is reused for all of its tables.

pub mod mysql;
pub mod postgres;

pub use mysql::MySqlBackend;
pub use postgres::PostgresBackend;

use crate::keys::{Key, KeyScheme, ORDERED_SCAN_LIMIT};
use crate::schema::{BenchTable, Engine};

/// SQL text for one benchmark table, built once before any timed loop.
///
/// Table names come from the fixed catalogue in [`crate::schema`] and are
/// interpolated; key and payload values are always bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatements {
    pub table: &'static str,
    /// Payload-only insert for engine-assigned keys, keyed insert otherwise.
    pub insert: String,
    pub point_lookup: String,
    pub ordered_ids: String,
    pub count_between: String,
    pub ordered_scan: String,
    pub scan_limit: i64,
}

impl TableStatements {
    pub fn new(table: &BenchTable) -> Self {
        let (engine, name) = (table.engine, table.name);
        let p = |n| engine.placeholder(n);
        let insert = if table.scheme.is_engine_assigned() {
            format!("INSERT INTO {name} (payload) VALUES ({})", p(1))
        } else {
            format!("INSERT INTO {name} (id, payload) VALUES ({}, {})", p(1), p(2))
        };
        Self {
            table: name,
            insert,
            point_lookup: format!("SELECT payload FROM {name} WHERE id = {}", p(1)),
            ordered_ids: format!("SELECT id FROM {name} ORDER BY id"),
            count_between: format!(
                "SELECT COUNT(*) FROM {name} WHERE id BETWEEN {} AND {}",
                p(1),
                p(2)
            ),
            ordered_scan: format!("SELECT id FROM {name} ORDER BY id LIMIT {ORDERED_SCAN_LIMIT}"),
            scan_limit: ORDERED_SCAN_LIMIT,
        }
    }
}

/// Statement-level operations the benchmark needs from an engine.
#[allow(async_fn_in_trait)]
pub trait Backend {
    fn engine(&self) -> Engine;

    /// Trivial round-trip to prove the engine is reachable.
    async fn ping(&mut self) -> Result<(), sqlx::Error>;

    /// Execute a statement that returns no rows.
    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error>;

    /// Insert one row. `key` is `None` when the engine assigns it.
    async fn insert(
        &mut self,
        sql: &TableStatements,
        key: Option<&Key>,
        payload: &str,
    ) -> Result<(), sqlx::Error>;

    /// Read back every engine-assigned key, ascending.
    async fn ordered_auto_keys(&mut self, sql: &TableStatements)
        -> Result<Vec<i64>, sqlx::Error>;

    /// Exact-match lookup by primary key, returning the payload.
    async fn point_lookup(
        &mut self,
        sql: &TableStatements,
        key: &Key,
    ) -> Result<String, sqlx::Error>;

    /// `COUNT(*)` over the inclusive key range `[lo, hi]`.
    async fn count_between(
        &mut self,
        sql: &TableStatements,
        lo: i64,
        hi: i64,
    ) -> Result<i64, sqlx::Error>;

    /// Read up to `sql.scan_limit` keys in key order, decoding each as
    /// `scheme`. Returns the number of rows read.
    async fn ordered_scan(
        &mut self,
        sql: &TableStatements,
        scheme: KeyScheme,
    ) -> Result<usize, sqlx::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MYSQL_TABLES, POSTGRES_TABLES};

    #[test]
    fn test_mysql_statements() {
        let auto = TableStatements::new(&MYSQL_TABLES[0]);
        assert_eq!(auto.insert, "INSERT INTO bench_auto (payload) VALUES (?)");
        assert_eq!(
            auto.count_between,
            "SELECT COUNT(*) FROM bench_auto WHERE id BETWEEN ? AND ?"
        );

        let bin = TableStatements::new(&MYSQL_TABLES[2]);
        assert_eq!(
            bin.insert,
            "INSERT INTO bench_uuid_bin (id, payload) VALUES (?, ?)"
        );
        assert_eq!(bin.table, "bench_uuid_bin");
    }

    #[test]
    fn test_postgres_statements() {
        let auto = TableStatements::new(&POSTGRES_TABLES[0]);
        assert_eq!(auto.insert, "INSERT INTO bench_auto (payload) VALUES ($1)");
        assert_eq!(auto.ordered_ids, "SELECT id FROM bench_auto ORDER BY id");

        let uuid = TableStatements::new(&POSTGRES_TABLES[1]);
        assert_eq!(
            uuid.insert,
            "INSERT INTO bench_uuid (id, payload) VALUES ($1, $2)"
        );
        assert_eq!(
            uuid.point_lookup,
            "SELECT payload FROM bench_uuid WHERE id = $1"
        );
        assert_eq!(
            uuid.ordered_scan,
            "SELECT id FROM bench_uuid ORDER BY id LIMIT 10000"
        );
        assert_eq!(uuid.scan_limit, 10_000);
    }
}
