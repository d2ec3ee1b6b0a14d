use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use quiz_core::model::ResultRecord;
use quiz_core::session::QuizSession;

use crate::keys::StorageKey;
use crate::repository::{KeyValueStore, StorageError};

/// Typed view over the key/value store.
///
/// Unreadable entries (bad JSON, failed invariants) are deleted and reported
/// as absent; backend failures are propagated.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    // ─── Flags ────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, StorageError> {
        self.flag(StorageKey::Authenticated).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn set_authenticated(&self, value: bool) -> Result<(), StorageError> {
        self.set_flag(StorageKey::Authenticated, value).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn guidelines_accepted(&self) -> Result<bool, StorageError> {
        self.flag(StorageKey::GuidelinesAccepted).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn set_guidelines_accepted(&self, value: bool) -> Result<(), StorageError> {
        self.set_flag(StorageKey::GuidelinesAccepted, value).await
    }

    async fn flag(&self, key: StorageKey) -> Result<bool, StorageError> {
        Ok(self.kv.get(key).await?.as_deref() == Some("true"))
    }

    async fn set_flag(&self, key: StorageKey, value: bool) -> Result<(), StorageError> {
        if value {
            self.kv.set(key, "true").await
        } else {
            self.kv.delete(key).await
        }
    }

    // ─── Quiz snapshot ────────────────────────────────────────────────────────

    /// Load the in-progress quiz snapshot, if a readable one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn load_quiz(&self) -> Result<Option<QuizSession>, StorageError> {
        self.load_json(StorageKey::QuizProgress).await
    }

    /// Serialize and store the full session snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save_quiz(&self, session: &QuizSession) -> Result<(), StorageError> {
        self.save_json(StorageKey::QuizProgress, session).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear_quiz(&self) -> Result<(), StorageError> {
        self.kv.delete(StorageKey::QuizProgress).await
    }

    // ─── Results ──────────────────────────────────────────────────────────────

    /// Load the last result unless it is older than `ttl` at `now`.
    ///
    /// Expired results are deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn load_results(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<ResultRecord>, StorageError> {
        let Some(record) = self.load_json::<ResultRecord>(StorageKey::LastResults).await? else {
            return Ok(None);
        };
        if record.is_expired(now, ttl) {
            tracing::debug!(created_at = %record.created_at(), "discarding expired results");
            self.kv.delete(StorageKey::LastResults).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save_results(&self, record: &ResultRecord) -> Result<(), StorageError> {
        self.save_json(StorageKey::LastResults, record).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear_results(&self) -> Result<(), StorageError> {
        self.kv.delete(StorageKey::LastResults).await
    }

    // ─── JSON helpers ─────────────────────────────────────────────────────────

    async fn load_json<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::debug!(%key, error = %err, "discarding unreadable entry");
                self.kv.delete(key).await?;
                Ok(None)
            }
        }
    }

    async fn save_json<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(key, &raw).await
    }
}
