use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::StoreError;
use crate::record::{CallRecord, EndpointCount};

use super::CallStore;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS calls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        endpoint TEXT NOT NULL,
        recorded_at_us INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_calls_endpoint ON calls(endpoint);
    CREATE INDEX IF NOT EXISTS idx_calls_recorded_at ON calls(recorded_at_us);";

/// Durable [`CallStore`] backed by sqlite.
///
/// Timestamps are persisted as integer microseconds since the Unix epoch so
/// ordering stays chronological regardless of locale. Aggregate queries run
/// store-native (`GROUP BY` / `ORDER BY`); nothing is cached in process.
#[derive(Clone)]
pub struct SqliteCallStore {
    conn: Connection,
}

impl SqliteCallStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the database cannot be
    /// opened or the schema cannot be created.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path.to_path_buf())
            .await
            .map_err(|err| StoreError::unavailable("open sqlite store", err))?;
        Self::init(conn).await
    }

    /// Opens a private in-memory database, useful for ephemeral deployments
    /// and tests. Records live as long as this store value (and its clones).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the database cannot be
    /// opened or the schema cannot be created.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|err| StoreError::unavailable("open sqlite store", err))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|err| StoreError::unavailable("initialize sqlite store", err))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CallStore for SqliteCallStore {
    async fn append(
        &self,
        endpoint: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<CallRecord, StoreError> {
        let endpoint = endpoint.to_owned();
        let recorded_at_us = recorded_at.timestamp_micros();
        let (id, endpoint) = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO calls (endpoint, recorded_at_us) VALUES (?1, ?2)",
                    rusqlite::params![endpoint, recorded_at_us],
                )?;
                Ok((conn.last_insert_rowid(), endpoint))
            })
            .await
            .map_err(|err| StoreError::unavailable("append call record", err))?;
        // Sub-microsecond precision is not persisted; return what was stored.
        let recorded_at = DateTime::from_timestamp_micros(recorded_at_us).unwrap_or(recorded_at);
        Ok(CallRecord {
            id,
            endpoint,
            recorded_at,
        })
    }

    async fn latest(&self) -> Result<Option<CallRecord>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, endpoint, recorded_at_us FROM calls
                     ORDER BY recorded_at_us DESC, id DESC LIMIT 1",
                )?;
                let record = stmt
                    .query_row([], |row| {
                        Ok(CallRecord {
                            id: row.get(0)?,
                            endpoint: row.get(1)?,
                            recorded_at: decode_recorded_at(2, row.get(2)?)?,
                        })
                    })
                    .optional()?;
                Ok(record)
            })
            .await
            .map_err(|err| StoreError::unavailable("query latest call", err))
    }

    async fn most_called(&self) -> Result<Option<EndpointCount>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT endpoint, COUNT(*) AS call_count FROM calls
                     GROUP BY endpoint ORDER BY call_count DESC, MIN(id) ASC LIMIT 1",
                )?;
                let entry = stmt
                    .query_row([], |row| {
                        Ok(EndpointCount {
                            endpoint: row.get(0)?,
                            count: clamp_count(row.get(1)?),
                        })
                    })
                    .optional()?;
                Ok(entry)
            })
            .await
            .map_err(|err| StoreError::unavailable("query most called endpoint", err))
    }

    async fn endpoint_counts(&self) -> Result<Vec<EndpointCount>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT endpoint, COUNT(*) FROM calls GROUP BY endpoint")?;
                let rows = stmt.query_map([], |row| {
                    Ok(EndpointCount {
                        endpoint: row.get(0)?,
                        count: clamp_count(row.get(1)?),
                    })
                })?;
                let mut counts = Vec::new();
                for row in rows {
                    counts.push(row?);
                }
                Ok(counts)
            })
            .await
            .map_err(|err| StoreError::unavailable("query endpoint counts", err))
    }
}

fn decode_recorded_at(column: usize, recorded_at_us: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(recorded_at_us)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(
            column,
            recorded_at_us,
        ))
}

fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
