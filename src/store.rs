//! Durable record store abstraction and backends.
mod memory;
mod sqlite;

#[cfg(test)]
mod tests;

pub use memory::MemoryCallStore;
pub use sqlite::SqliteCallStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::record::{CallRecord, EndpointCount};

/// Append + aggregate-query interface over the durable record collection.
///
/// The store exclusively owns the collection: callers only ever append new
/// records or run read-only aggregate queries, never mutate in place. A read
/// concurrent with a write may or may not observe that write.
///
/// Tie-breaks are part of each backend's documented contract, and both
/// shipped backends resolve them identically:
/// - `latest`: among records sharing the maximum timestamp, the most
///   recently inserted one (greatest id) is returned.
/// - `most_called`: among endpoints sharing the maximum count, the endpoint
///   recorded earliest (smallest first id) is returned, so repeated calls on
///   an unchanged record set return the same answer.
///
/// Callers must not rely on either tie-break.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// Durably appends one record and returns it with its assigned id and
    /// the timestamp as persisted. Atomic: on failure nothing is added.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot accept the
    /// write.
    async fn append(
        &self,
        endpoint: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<CallRecord, StoreError>;

    /// Returns the record with the maximum timestamp, or `None` when the
    /// store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be queried.
    async fn latest(&self) -> Result<Option<CallRecord>, StoreError>;

    /// Returns the endpoint with the most records together with its count,
    /// or `None` when the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be queried.
    async fn most_called(&self) -> Result<Option<EndpointCount>, StoreError>;

    /// Returns one entry per distinct endpoint with its total count. The
    /// sequence order is unspecified. Empty when the store holds no records;
    /// this query never signals not-found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be queried.
    async fn endpoint_counts(&self) -> Result<Vec<EndpointCount>, StoreError>;
}
