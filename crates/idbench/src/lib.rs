//! Primary-key strategy benchmark.
//!
//! Measures AUTO_INCREMENT integer keys against random UUID keys (text,
//! binary and native encodings) on MySQL and PostgreSQL: bulk insert,
//! point lookup and a range query per table, printed as CSV.
//!
//! # Variants
//!
//! | engine   | table             | key                        |
//! |----------|-------------------|----------------------------|
//! | mysql    | `bench_auto`      | `BIGINT AUTO_INCREMENT`    |
//! | mysql    | `bench_uuid_char` | `CHAR(36)`                 |
//! | mysql    | `bench_uuid_bin`  | `BINARY(16)`               |
//! | postgres | `bench_auto`      | `BIGSERIAL`                |
//! | postgres | `bench_uuid`      | `UUID`                     |
//!
//! The `range_or_orderby_sec` column is a bounded `COUNT(*)` for the
//! auto-increment tables but a capped `ORDER BY id LIMIT 10000` scan for
//! the UUID tables. The two are not comparable.

pub mod backends;
pub mod config;
pub mod error;
pub mod keys;
pub mod report;
pub mod runner;
pub mod schema;
pub mod session;

pub use backends::{Backend, MySqlBackend, PostgresBackend};
pub use config::{Args, BenchConfig, EngineConfig, Workload};
pub use error::{Error, Phase, Result};
pub use keys::{bytes_to_uuid, uuid_to_bytes, Key, KeyScheme, RangeQuery};
pub use report::{format_results, format_summary, summarize, BenchResult, EngineSummary};
pub use runner::{chunk_bounds, range_bounds, run_all};
pub use schema::{BenchTable, Engine};
pub use session::run_session;
