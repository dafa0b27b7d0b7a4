use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed invocation of a named endpoint.
///
/// Records are immutable once created: no operation in this crate updates or
/// deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Store-assigned insertion identity, strictly increasing within a store.
    /// Only used as the documented tie-break for aggregate queries; callers
    /// must not rely on its value.
    pub id: i64,
    /// Free-form endpoint name. Empty or arbitrary strings are accepted.
    pub endpoint: String,
    /// Timestamp assigned by the recorder at append time, with microsecond
    /// precision. Always a true chronological value, never a formatted
    /// string, so ordering holds across locales and DST boundaries.
    pub recorded_at: DateTime<Utc>,
}

/// Total number of records for one distinct endpoint.
///
/// A count is always >= 1: an endpoint with no records simply has no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}
