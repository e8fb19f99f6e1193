//! PostgreSQL backend.
//!
//! Auto-increment tables use BIGSERIAL; UUID tables use the native UUID
//! column type, bound directly as `uuid::Uuid`.

use sqlx::postgres::{PgArguments, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, Postgres, Row};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{self, Error};
use crate::keys::{Key, KeyScheme};
use crate::schema::Engine;

use super::{Backend, TableStatements};

/// PostgreSQL backend over a single connection.
pub struct PostgresBackend {
    conn: PgConnection,
}

impl PostgresBackend {
    /// Open the connection described by `config`.
    pub async fn connect(config: &EngineConfig) -> error::Result<Self> {
        tracing::info!(url = %config.redacted_url("postgres"), "connecting");
        let conn = PgConnection::connect_with(&config.postgres_options())
            .await
            .map_err(|source| Error::Connect {
                engine: Engine::Postgres,
                source,
            })?;
        Ok(Self { conn })
    }

    /// Close the connection, logging rather than failing on error.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            tracing::warn!(engine = "postgres", error = %e, "failed to close connection");
        }
    }
}

impl Backend for PostgresBackend {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        self.conn.ping().await
    }

    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
        sqlx::query(statement).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn insert(
        &mut self,
        sql: &TableStatements,
        key: Option<&Key>,
        payload: &str,
    ) -> Result<(), sqlx::Error> {
        let query = match key {
            None => sqlx::query(&sql.insert),
            Some(key) => bind_key(sqlx::query(&sql.insert), key),
        };
        query.bind(payload).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn ordered_auto_keys(
        &mut self,
        sql: &TableStatements,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(&sql.ordered_ids)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn point_lookup(
        &mut self,
        sql: &TableStatements,
        key: &Key,
    ) -> Result<String, sqlx::Error> {
        let row = bind_key(sqlx::query(&sql.point_lookup), key)
            .fetch_one(&mut self.conn)
            .await?;
        row.try_get(0)
    }

    async fn count_between(
        &mut self,
        sql: &TableStatements,
        lo: i64,
        hi: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(&sql.count_between)
            .bind(lo)
            .bind(hi)
            .fetch_one(&mut self.conn)
            .await
    }

    async fn ordered_scan(
        &mut self,
        sql: &TableStatements,
        scheme: KeyScheme,
    ) -> Result<usize, sqlx::Error> {
        let rows = sqlx::query(&sql.ordered_scan)
            .fetch_all(&mut self.conn)
            .await?;
        for row in &rows {
            decode_key(row, scheme)?;
        }
        Ok(rows.len())
    }
}

fn bind_key<'q>(
    query: Query<'q, Postgres, PgArguments>,
    key: &'q Key,
) -> Query<'q, Postgres, PgArguments> {
    match key {
        Key::Auto(id) => query.bind(*id),
        Key::Text(text) => query.bind(text.as_str()),
        Key::Binary(bytes) => query.bind(&bytes[..]),
        Key::Uuid(id) => query.bind(*id),
    }
}

fn decode_key(row: &PgRow, scheme: KeyScheme) -> Result<(), sqlx::Error> {
    match scheme {
        KeyScheme::AutoIncrement => {
            row.try_get::<i64, _>(0)?;
        }
        KeyScheme::UuidText => {
            row.try_get::<String, _>(0)?;
        }
        KeyScheme::UuidBinary => {
            row.try_get::<Vec<u8>, _>(0)?;
        }
        KeyScheme::UuidNative => {
            row.try_get::<Uuid, _>(0)?;
        }
    }
    Ok(())
}
