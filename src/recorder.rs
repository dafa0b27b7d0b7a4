use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::AppResult;
use crate::record::CallRecord;
use crate::store::CallStore;

/// Appends one immutable [`CallRecord`] per call notification.
///
/// The recorder assigns the timestamp itself at append time; callers never
/// supply one. It holds no state beyond the store handle, so it is safe to
/// call concurrently from any number of callers. Each call produces an
/// independent record with no ordering imposed between concurrent calls
/// beyond each record's own timestamp.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn CallStore>,
}

impl Recorder {
    #[must_use]
    pub fn new(store: Arc<dyn CallStore>) -> Self {
        Self { store }
    }

    /// Records a completed call to `endpoint` and returns the persisted
    /// record, including its assigned id and timestamp. The endpoint name is
    /// not validated; empty or arbitrary strings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Unavailable`] when the store
    /// cannot accept the write. No retry is attempted; the caller decides
    /// whether to retry.
    pub async fn record(&self, endpoint: &str) -> AppResult<CallRecord> {
        let record = self.store.append(endpoint, Utc::now()).await?;
        debug!(
            endpoint = record.endpoint.as_str(),
            id = record.id,
            "recorded call"
        );
        Ok(record)
    }
}
