//! Benchmark table catalogue and schema reset.
//!
//! Each engine owns a fixed set of two-column tables (key, payload). A run
//! drops and recreates all of them before any variant is measured; the
//! tables are left in place afterwards for inspection.

use std::fmt;

use crate::backends::Backend;
use crate::error::{Error, Result};
use crate::keys::KeyScheme;

/// Target database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    MySql,
    Postgres,
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::Postgres => "postgres",
        }
    }

    /// Bind placeholder for the `n`th (1-based) statement parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Engine::MySql => "?".to_string(),
            Engine::Postgres => format!("${n}"),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One benchmark table variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchTable {
    pub engine: Engine,
    pub name: &'static str,
    pub scheme: KeyScheme,
    pub ddl: &'static str,
}

/// MySQL variants, in run order.
pub const MYSQL_TABLES: [BenchTable; 3] = [
    BenchTable {
        engine: Engine::MySql,
        name: "bench_auto",
        scheme: KeyScheme::AutoIncrement,
        ddl: r#"CREATE TABLE bench_auto (
            id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            payload VARCHAR(100) NOT NULL
        ) ENGINE=InnoDB"#,
    },
    BenchTable {
        engine: Engine::MySql,
        name: "bench_uuid_char",
        scheme: KeyScheme::UuidText,
        ddl: r#"CREATE TABLE bench_uuid_char (
            id CHAR(36) NOT NULL PRIMARY KEY,
            payload VARCHAR(100) NOT NULL
        ) ENGINE=InnoDB"#,
    },
    BenchTable {
        engine: Engine::MySql,
        name: "bench_uuid_bin",
        scheme: KeyScheme::UuidBinary,
        ddl: r#"CREATE TABLE bench_uuid_bin (
            id BINARY(16) NOT NULL PRIMARY KEY,
            payload VARCHAR(100) NOT NULL
        ) ENGINE=InnoDB"#,
    },
];

/// PostgreSQL variants, in run order.
pub const POSTGRES_TABLES: [BenchTable; 2] = [
    BenchTable {
        engine: Engine::Postgres,
        name: "bench_auto",
        scheme: KeyScheme::AutoIncrement,
        ddl: r#"CREATE TABLE bench_auto (
            id BIGSERIAL PRIMARY KEY,
            payload TEXT NOT NULL
        )"#,
    },
    BenchTable {
        engine: Engine::Postgres,
        name: "bench_uuid",
        scheme: KeyScheme::UuidNative,
        ddl: r#"CREATE TABLE bench_uuid (
            id UUID PRIMARY KEY,
            payload TEXT NOT NULL
        )"#,
    },
];

/// Tables owned by `engine`, in run order.
pub fn tables(engine: Engine) -> &'static [BenchTable] {
    match engine {
        Engine::MySql => &MYSQL_TABLES,
        Engine::Postgres => &POSTGRES_TABLES,
    }
}

/// Statements that reset `engine`'s schema: every drop, then every create.
pub fn reset_statements(engine: Engine) -> Vec<String> {
    let tables = tables(engine);
    tables
        .iter()
        .map(|t| format!("DROP TABLE IF EXISTS {}", t.name))
        .chain(tables.iter().map(|t| t.ddl.to_string()))
        .collect()
}

/// Drop and recreate every benchmark table on `backend`.
///
/// Stops at the first failing statement; nothing already dropped or
/// created is rolled back.
pub async fn reset_schema<B: Backend>(backend: &mut B) -> Result<()> {
    let engine = backend.engine();
    for statement in reset_statements(engine) {
        backend
            .execute(&statement)
            .await
            .map_err(|source| Error::Schema { engine, source })?;
    }
    tracing::info!(%engine, tables = tables(engine).len(), "schema reset");
    Ok(())
}
