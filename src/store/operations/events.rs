use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::types::ProgressEvent;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// Persisted progression milestone (level up, streak, badge).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEventRecord {
    pub id: String,
    pub kid_name: String,
    #[serde(flatten)]
    pub event: ProgressEvent,
    pub created_at: DateTime<Utc>,
}

impl ProgressEventRecord {
    pub fn new(kid_name: &str, event: ProgressEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kid_name: kid_name.to_string(),
            event,
            created_at: Utc::now(),
        }
    }
}

impl Store {
    /// Newest first, by key construction.
    pub fn events_for_kid(
        &self,
        kid_name: &str,
        limit: usize,
    ) -> Result<Vec<ProgressEventRecord>, StoreError> {
        let prefix = keys::event_prefix(kid_name)?;
        let mut records = Vec::new();
        for item in self.events.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize::<ProgressEventRecord>(&value)?);
            if records.len() >= limit {
                break;
            }
        }
        Ok(records)
    }
}
