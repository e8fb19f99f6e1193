//! Benchmark error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::schema::Engine;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Benchmark phase a statement belonged to when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Insert,
    Sample,
    Lookup,
    Range,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Insert => "insert",
            Phase::Sample => "sample",
            Phase::Lookup => "lookup",
            Phase::Range => "range",
        };
        f.write_str(name)
    }
}

/// Benchmark errors. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid row or lookup count.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opening the connection failed.
    #[error("{engine} connection failed: {source}")]
    Connect {
        engine: Engine,
        #[source]
        source: sqlx::Error,
    },

    /// The reachability round-trip failed.
    #[error("{engine} ping failed: {source}")]
    Unreachable {
        engine: Engine,
        #[source]
        source: sqlx::Error,
    },

    /// A drop/create statement failed.
    #[error("{engine} setup failed: {source}")]
    Schema {
        engine: Engine,
        #[source]
        source: sqlx::Error,
    },

    /// A statement inside a timed phase failed.
    #[error("{engine}.{table} {phase} failed: {source}")]
    Phase {
        engine: Engine,
        table: &'static str,
        phase: Phase,
        #[source]
        source: sqlx::Error,
    },

    /// The overall deadline elapsed.
    #[error("benchmark exceeded deadline of {0:?}")]
    Timeout(Duration),

    /// A binary key was not 16 bytes long.
    #[error("uuid bytes length must be 16, got {0}")]
    InvalidKeyLength(usize),
}
