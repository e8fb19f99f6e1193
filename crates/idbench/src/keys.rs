//! Primary-key schemes and the key values they produce.
//!
//! Each scheme knows how to generate a fresh key for an insert and which
//! range query makes sense for it. Auto-increment keys are assigned by the
//! engine, so they are never generated client-side.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Row cap for the ordered scan used in place of a range query on UUID keys.
pub const ORDERED_SCAN_LIMIT: i64 = 10_000;

/// How a benchmark table stores its primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// Engine-assigned BIGINT (AUTO_INCREMENT / BIGSERIAL).
    AutoIncrement,
    /// Random UUID as a 36-character hyphenated string (CHAR(36)).
    UuidText,
    /// Random UUID as 16 raw bytes (BINARY(16)).
    UuidBinary,
    /// Random UUID in the engine's native UUID column type.
    UuidNative,
}

/// Query used for the third timed phase.
///
/// The two range queries measure different things and their timings are not
/// comparable: `CountBetween` is one aggregate over an inclusive integer
/// range, `OrderedScan` reads back up to `limit` keys in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeQuery {
    CountBetween,
    OrderedScan { limit: i64 },
}

impl KeyScheme {
    /// Generate a key for one insert, or `None` when the engine assigns it.
    pub fn generate(self) -> Option<Key> {
        match self {
            KeyScheme::AutoIncrement => None,
            KeyScheme::UuidText => Some(Key::Text(Uuid::new_v4().hyphenated().to_string())),
            KeyScheme::UuidBinary => Some(Key::Binary(uuid_to_bytes(&Uuid::new_v4()))),
            KeyScheme::UuidNative => Some(Key::Uuid(Uuid::new_v4())),
        }
    }

    /// Whether the engine assigns keys for this scheme.
    pub fn is_engine_assigned(self) -> bool {
        matches!(self, KeyScheme::AutoIncrement)
    }

    pub fn range_query(self) -> RangeQuery {
        match self {
            KeyScheme::AutoIncrement => RangeQuery::CountBetween,
            _ => RangeQuery::OrderedScan {
                limit: ORDERED_SCAN_LIMIT,
            },
        }
    }
}

/// A primary-key value, encoded the way it is bound to a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Auto(i64),
    Text(String),
    Binary([u8; 16]),
    Uuid(Uuid),
}

/// Copy a UUID into its 16-byte storage form.
pub fn uuid_to_bytes(id: &Uuid) -> [u8; 16] {
    *id.as_bytes()
}

/// Restore a UUID from its 16-byte storage form.
pub fn bytes_to_uuid(bytes: &[u8]) -> Result<Uuid> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| Error::InvalidKeyLength(bytes.len()))?;
    Ok(Uuid::from_bytes(raw))
}

/// Deterministic payload for the row at `index`.
pub fn payload_for(index: usize) -> String {
    format!("p-{index}")
}
