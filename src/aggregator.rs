use std::sync::Arc;

use crate::error::AppResult;
use crate::record::{CallRecord, EndpointCount};
use crate::store::CallStore;

/// Computes derived views over all accumulated [`CallRecord`]s.
///
/// Every query recomputes from the full record set on demand; no aggregate
/// state is cached in memory, so there is nothing to invalidate and reads
/// stay correct under concurrent writes. Reads are idempotent: repeated
/// calls on an unchanged record set return identical results. On failure no
/// partial results are returned.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn CallStore>,
}

impl Aggregator {
    #[must_use]
    pub fn new(store: Arc<dyn CallStore>) -> Self {
        Self { store }
    }

    /// Returns the most recently recorded call, or `None` when no records
    /// exist. Tie-break among equal timestamps follows the store's
    /// documented insertion order; callers must not rely on it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Unavailable`] when the store
    /// cannot be queried.
    pub async fn latest(&self) -> AppResult<Option<CallRecord>> {
        Ok(self.store.latest().await?)
    }

    /// Returns the endpoint with the highest call count, or `None` when no
    /// records exist. A count of zero cannot occur; absence of data is the
    /// `None` case, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Unavailable`] when the store
    /// cannot be queried.
    pub async fn most_called(&self) -> AppResult<Option<EndpointCount>> {
        Ok(self.store.most_called().await?)
    }

    /// Returns one entry per distinct endpoint with its total call count,
    /// in unspecified order. Empty when no records exist; this never
    /// signals not-found.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Unavailable`] when the store
    /// cannot be queried.
    pub async fn endpoint_counts(&self) -> AppResult<Vec<EndpointCount>> {
        Ok(self.store.endpoint_counts().await?)
    }
}
