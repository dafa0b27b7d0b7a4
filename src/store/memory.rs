use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::record::{CallRecord, EndpointCount};

use super::CallStore;

#[derive(Debug, Clone)]
struct StoredCall {
    id: i64,
    endpoint: String,
    recorded_at: DateTime<Utc>,
}

/// In-process [`CallStore`] holding records in memory.
///
/// Durable only for the lifetime of the process; intended for tests and
/// ephemeral deployments. Aggregations are full scans over the record set,
/// implementing the same tie-break contract as the sqlite backend.
#[derive(Debug, Default)]
pub struct MemoryCallStore {
    calls: Mutex<Vec<StoredCall>>,
}

impl MemoryCallStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredCall>>, StoreError> {
        self.calls.lock().map_err(|err| {
            StoreError::unavailable("lock memory store", std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl CallStore for MemoryCallStore {
    async fn append(
        &self,
        endpoint: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<CallRecord, StoreError> {
        let mut calls = self.lock()?;
        let id = calls.last().map_or(1, |call| call.id.saturating_add(1));
        calls.push(StoredCall {
            id,
            endpoint: endpoint.to_owned(),
            recorded_at,
        });
        Ok(CallRecord {
            id,
            endpoint: endpoint.to_owned(),
            recorded_at,
        })
    }

    async fn latest(&self) -> Result<Option<CallRecord>, StoreError> {
        let calls = self.lock()?;
        // Unique ids break timestamp ties in favor of the newest insertion.
        let latest = calls
            .iter()
            .max_by_key(|call| (call.recorded_at, call.id))
            .map(|call| CallRecord {
                id: call.id,
                endpoint: call.endpoint.clone(),
                recorded_at: call.recorded_at,
            });
        Ok(latest)
    }

    async fn most_called(&self) -> Result<Option<EndpointCount>, StoreError> {
        let calls = self.lock()?;
        let mut best: Option<EndpointCount> = None;
        for entry in group_counts(&calls) {
            let better = best
                .as_ref()
                .is_none_or(|current| entry.count > current.count);
            if better {
                best = Some(entry);
            }
        }
        Ok(best)
    }

    async fn endpoint_counts(&self) -> Result<Vec<EndpointCount>, StoreError> {
        let calls = self.lock()?;
        Ok(group_counts(&calls))
    }
}

/// Groups records by endpoint in first-seen order, which keeps
/// `most_called` deterministic on an unchanged record set.
fn group_counts(calls: &[StoredCall]) -> Vec<EndpointCount> {
    let mut groups: Vec<EndpointCount> = Vec::new();
    for call in calls {
        match groups
            .iter_mut()
            .find(|entry| entry.endpoint == call.endpoint)
        {
            Some(entry) => entry.count = entry.count.saturating_add(1),
            None => groups.push(EndpointCount {
                endpoint: call.endpoint.clone(),
                count: 1,
            }),
        }
    }
    groups
}
