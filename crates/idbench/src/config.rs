//! Benchmark configuration.

use std::time::Duration;

use clap::Parser;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::{Error, Result};

/// Default number of rows inserted into each table.
pub const DEFAULT_ROWS: i64 = 100_000;

/// Default number of point lookups per table.
pub const DEFAULT_LOOKUPS: i64 = 20_000;

/// Default overall deadline in seconds (1 hour).
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Connection parameters for one engine. Passed to the driver uninspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl EngineConfig {
    /// Local defaults shared by both engines, differing only in port.
    pub fn local(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            user: "bench".to_string(),
            password: "bench".to_string(),
            database: "idbench".to_string(),
        }
    }

    pub fn mysql_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(MySqlSslMode::Disabled)
    }

    pub fn postgres_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }

    /// Connection URL without the password, for logs.
    pub fn redacted_url(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Validated row/lookup counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    pub rows: usize,
    pub lookups: usize,
}

impl Workload {
    /// Number of point lookups a variant actually performs.
    pub fn sample_size(&self) -> usize {
        self.lookups.min(self.rows)
    }
}

/// Full benchmark configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub rows: i64,
    pub lookups: i64,
    pub mysql: EngineConfig,
    pub postgres: EngineConfig,
    pub timeout: Duration,
    pub summary: bool,
}

impl BenchConfig {
    /// Validate the counts and return them as a [`Workload`].
    pub fn workload(&self) -> Result<Workload> {
        if self.rows <= 0 {
            return Err(Error::Config("rows must be > 0".into()));
        }
        if self.lookups <= 0 {
            return Err(Error::Config("lookups must be > 0".into()));
        }
        Ok(Workload {
            rows: self.rows as usize,
            lookups: self.lookups as usize,
        })
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            lookups: DEFAULT_LOOKUPS,
            mysql: EngineConfig::local(DEFAULT_MYSQL_PORT),
            postgres: EngineConfig::local(DEFAULT_POSTGRES_PORT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            summary: false,
        }
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "idbench")]
#[command(
    version,
    about = "Benchmark AUTO_INCREMENT vs UUID primary keys on MySQL and PostgreSQL",
    long_about = None
)]
pub struct Args {
    /// Number of rows to insert for each table.
    #[arg(long, default_value_t = DEFAULT_ROWS, allow_negative_numbers = true)]
    pub rows: i64,

    /// Number of point lookups by primary key.
    #[arg(long, default_value_t = DEFAULT_LOOKUPS, allow_negative_numbers = true)]
    pub lookups: i64,

    /// MySQL host
    #[arg(long, default_value = "127.0.0.1")]
    pub mysql_host: String,

    /// MySQL port
    #[arg(long, default_value_t = DEFAULT_MYSQL_PORT)]
    pub mysql_port: u16,

    /// MySQL user
    #[arg(long, default_value = "bench")]
    pub mysql_user: String,

    /// MySQL password
    #[arg(long, default_value = "bench")]
    pub mysql_password: String,

    /// MySQL database
    #[arg(long, default_value = "idbench")]
    pub mysql_db: String,

    /// PostgreSQL host
    #[arg(long, default_value = "127.0.0.1")]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, default_value_t = DEFAULT_POSTGRES_PORT)]
    pub pg_port: u16,

    /// PostgreSQL user
    #[arg(long, default_value = "bench")]
    pub pg_user: String,

    /// PostgreSQL password
    #[arg(long, default_value = "bench")]
    pub pg_password: String,

    /// PostgreSQL database
    #[arg(long, default_value = "idbench")]
    pub pg_db: String,

    /// Overall deadline for the whole run, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print per-engine insert mean/stddev after the results table.
    #[arg(long)]
    pub summary: bool,
}

impl Args {
    /// Convert command-line arguments to benchmark configuration.
    pub fn into_config(self) -> BenchConfig {
        BenchConfig {
            rows: self.rows,
            lookups: self.lookups,
            mysql: EngineConfig {
                host: self.mysql_host,
                port: self.mysql_port,
                user: self.mysql_user,
                password: self.mysql_password,
                database: self.mysql_db,
            },
            postgres: EngineConfig {
                host: self.pg_host,
                port: self.pg_port,
                user: self.pg_user,
                password: self.pg_password,
                database: self.pg_db,
            },
            timeout: Duration::from_secs(self.timeout_secs),
            summary: self.summary,
        }
    }
}
