use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::engine::types::ProgressState;
use crate::store::keys;
use crate::store::operations::events::ProgressEventRecord;
use crate::store::{Store, StoreError};

/// One scored attempt, as the parent dashboard consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub id: String,
    pub kid_name: String,
    pub buddy: String,
    pub sound: String,
    pub word: String,
    /// 1-based attempt number within the mission instance.
    pub attempts: u32,
    pub success: bool,
    pub transcript: String,
    pub is_near_miss: bool,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Persist one scored attempt together with the updated profile and
    /// any progression events, atomically. The time index is maintained
    /// outside the transaction; it is idempotent and can be rebuilt
    /// from the attempts tree (see migrations).
    pub fn record_attempt(
        &self,
        record: &AttemptRecord,
        state: &ProgressState,
        events: &[ProgressEventRecord],
    ) -> Result<(), StoreError> {
        let ts = record.created_at.timestamp_millis();
        let attempt_key = keys::attempt_key(&record.kid_name, ts, &record.id)?;
        let attempt_bytes = Self::serialize(record)?;

        let profile_key = keys::profile_key(&state.kid_name)?;
        let profile_bytes = Self::serialize(state)?;

        let mut event_payloads = Vec::with_capacity(events.len());
        for event in events {
            let key = keys::event_key(
                &event.kid_name,
                event.created_at.timestamp_millis(),
                &event.id,
            )?;
            event_payloads.push((key, Self::serialize(event)?));
        }

        let time_index_key = keys::attempt_time_key(ts, &record.id);

        (&self.attempts, &self.profiles, &self.events)
            .transaction(|(tx_attempts, tx_profiles, tx_events)| {
                tx_attempts.insert(attempt_key.as_bytes(), attempt_bytes.as_slice())?;
                tx_profiles.insert(profile_key.as_bytes(), profile_bytes.as_slice())?;
                for (key, bytes) in &event_payloads {
                    tx_events.insert(key.as_bytes(), bytes.as_slice())?;
                }
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        let _ = self
            .attempts_by_time
            .insert(time_index_key.as_bytes(), record.kid_name.as_bytes());

        Ok(())
    }

    /// Newest first, by key construction.
    pub fn attempts_for_kid(
        &self,
        kid_name: &str,
        limit: usize,
    ) -> Result<Vec<AttemptRecord>, StoreError> {
        let prefix = keys::attempt_prefix(kid_name)?;
        let mut records = Vec::new();
        for item in self.attempts.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize::<AttemptRecord>(&value)?);
            if records.len() >= limit {
                break;
            }
        }
        Ok(records)
    }

    pub fn count_attempts_for_kid(&self, kid_name: &str) -> Result<usize, StoreError> {
        let prefix = keys::attempt_prefix(kid_name)?;
        let mut count = 0usize;
        for item in self.attempts.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    /// Kid name of every attempt in `[start_ms, end_ms)`, via the time
    /// index. One entry per attempt; callers aggregate.
    pub fn attempt_kids_between(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<String>, StoreError> {
        let start = keys::attempt_time_since_key(start_ms);
        let end = keys::attempt_time_since_key(end_ms);
        let mut kids = Vec::new();
        for item in self.attempts_by_time.range(start.as_bytes()..end.as_bytes()) {
            let (_, value) = item?;
            kids.push(String::from_utf8_lossy(&value).into_owned());
        }
        Ok(kids)
    }

    pub fn count_attempts_between_for_kid(
        &self,
        kid_name: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<u64, StoreError> {
        let start = keys::attempt_time_since_key(start_ms);
        let end = keys::attempt_time_since_key(end_ms);
        let mut count = 0u64;
        for item in self.attempts_by_time.range(start.as_bytes()..end.as_bytes()) {
            let (_, value) = item?;
            if value.as_ref() == kid_name.as_bytes() {
                count += 1;
            }
        }
        Ok(count)
    }
}
