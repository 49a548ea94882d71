//! Key layout of the persisted session snapshot.
//!
//! The snapshot is spread over four string keys, each holding a JSON value:
//!
//! | key                     | value                                   |
//! |-------------------------|-----------------------------------------|
//! | `answers`               | array of `UserAnswer` objects           |
//! | `currentIndex`          | number                                  |
//! | `started`               | boolean                                 |
//! | `lastQuestionStartTime` | RFC 3339 timestamp string (UTC)         |

use chrono::{DateTime, Utc};
use quiz_core::model::{SessionSnapshot, UserAnswer};

use crate::repository::{SnapshotStore, StorageError};

pub const ANSWERS_KEY: &str = "answers";
pub const CURRENT_INDEX_KEY: &str = "currentIndex";
pub const STARTED_KEY: &str = "started";
pub const QUESTION_STARTED_AT_KEY: &str = "lastQuestionStartTime";

pub const SNAPSHOT_KEYS: [&str; 4] = [
    ANSWERS_KEY,
    CURRENT_INDEX_KEY,
    STARTED_KEY,
    QUESTION_STARTED_AT_KEY,
];

fn ser<E: core::fmt::Display>(key: &str, e: E) -> StorageError {
    StorageError::Serialization(format!("{key}: {e}"))
}

/// Raw persisted values of a snapshot, one string per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshotRecord {
    pub answers: String,
    pub current_index: String,
    pub started: String,
    pub question_started_at: String,
}

impl SessionSnapshotRecord {
    /// Encode a snapshot into its persisted string form.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the answers cannot be encoded.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Result<Self, StorageError> {
        Ok(Self {
            answers: serde_json::to_string(&snapshot.answers).map_err(|e| ser(ANSWERS_KEY, e))?,
            current_index: snapshot.current_index.to_string(),
            started: snapshot.started.to_string(),
            question_started_at: serde_json::to_string(&snapshot.question_started_at)
                .map_err(|e| ser(QUESTION_STARTED_AT_KEY, e))?,
        })
    }

    /// Decode the persisted strings back into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if any value does not parse.
    pub fn into_snapshot(self) -> Result<SessionSnapshot, StorageError> {
        let answers: Vec<UserAnswer> =
            serde_json::from_str(&self.answers).map_err(|e| ser(ANSWERS_KEY, e))?;
        let current_index: usize =
            serde_json::from_str(&self.current_index).map_err(|e| ser(CURRENT_INDEX_KEY, e))?;
        let started: bool =
            serde_json::from_str(&self.started).map_err(|e| ser(STARTED_KEY, e))?;
        let question_started_at: DateTime<Utc> = serde_json::from_str(&self.question_started_at)
            .map_err(|e| ser(QUESTION_STARTED_AT_KEY, e))?;

        Ok(SessionSnapshot {
            answers,
            current_index,
            started,
            question_started_at,
        })
    }

    /// Read all four keys. Returns `Ok(None)` if any key is missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn load_raw(store: &dyn SnapshotStore) -> Result<Option<Self>, StorageError> {
        let Some(answers) = store.get(ANSWERS_KEY).await? else {
            return Ok(None);
        };
        let Some(current_index) = store.get(CURRENT_INDEX_KEY).await? else {
            return Ok(None);
        };
        let Some(started) = store.get(STARTED_KEY).await? else {
            return Ok(None);
        };
        let Some(question_started_at) = store.get(QUESTION_STARTED_AT_KEY).await? else {
            return Ok(None);
        };
        Ok(Some(Self {
            answers,
            current_index,
            started,
            question_started_at,
        }))
    }

    /// Read and decode the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures or unparsable values.
    pub async fn load(store: &dyn SnapshotStore) -> Result<Option<SessionSnapshot>, StorageError> {
        Self::load_raw(store)
            .await?
            .map(Self::into_snapshot)
            .transpose()
    }

    /// Write all four keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or any write fails.
    pub async fn save(store: &dyn SnapshotStore, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let record = Self::from_snapshot(snapshot)?;
        store.set(ANSWERS_KEY, &record.answers).await?;
        store.set(CURRENT_INDEX_KEY, &record.current_index).await?;
        store.set(STARTED_KEY, &record.started).await?;
        store
            .set(QUESTION_STARTED_AT_KEY, &record.question_started_at)
            .await?;
        Ok(())
    }

    /// Remove all four keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any delete fails.
    pub async fn clear(store: &dyn SnapshotStore) -> Result<(), StorageError> {
        for key in SNAPSHOT_KEYS {
            store.remove(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use quiz_core::model::{OptionId, QuestionId};
    use quiz_core::time::fixed_now;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            answers: vec![UserAnswer::new(
                QuestionId::new(1),
                Some(OptionId::new("b")),
                true,
                8,
            )],
            current_index: 1,
            started: true,
            question_started_at: fixed_now(),
        }
    }

    #[test]
    fn encodes_scalars_as_json() {
        let record = SessionSnapshotRecord::from_snapshot(&snapshot()).unwrap();
        assert_eq!(record.current_index, "1");
        assert_eq!(record.started, "true");
        assert_eq!(record.question_started_at, "\"2023-11-14T22:13:20Z\"");
        assert!(record.answers.starts_with("[{\"questionId\":1"));
    }

    #[tokio::test]
    async fn save_then_load_restores_snapshot() {
        let repo = InMemoryRepository::new();
        SessionSnapshotRecord::save(&repo, &snapshot()).await.unwrap();
        assert_eq!(repo.len().unwrap(), 4);

        let loaded = SessionSnapshotRecord::load(&repo).await.unwrap();
        assert_eq!(loaded, Some(snapshot()));
    }

    #[tokio::test]
    async fn anchor_is_stored_as_rfc3339_string() {
        let repo = InMemoryRepository::new();
        let mut snap = snapshot();
        snap.question_started_at = fixed_now() + chrono::Duration::milliseconds(250);
        SessionSnapshotRecord::save(&repo, &snap).await.unwrap();

        let raw = repo.get(QUESTION_STARTED_AT_KEY).await.unwrap().unwrap();
        let text: String = serde_json::from_str(&raw).unwrap();
        let parsed = DateTime::parse_from_rfc3339(&text).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), snap.question_started_at);

        let loaded = SessionSnapshotRecord::load(&repo).await.unwrap().unwrap();
        assert_eq!(loaded.question_started_at, snap.question_started_at);
    }

    #[tokio::test]
    async fn epoch_millis_anchor_is_rejected() {
        let repo = InMemoryRepository::new();
        SessionSnapshotRecord::save(&repo, &snapshot()).await.unwrap();
        repo.set(QUESTION_STARTED_AT_KEY, "1700000000000").await.unwrap();
        assert!(matches!(
            SessionSnapshotRecord::load(&repo).await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let repo = InMemoryRepository::new();
        SessionSnapshotRecord::save(&repo, &snapshot()).await.unwrap();
        repo.remove(STARTED_KEY).await.unwrap();
        assert_eq!(SessionSnapshotRecord::load(&repo).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_value_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        SessionSnapshotRecord::save(&repo, &snapshot()).await.unwrap();
        repo.set(CURRENT_INDEX_KEY, "not-a-number").await.unwrap();

        let err = SessionSnapshotRecord::load(&repo).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(msg) if msg.starts_with(CURRENT_INDEX_KEY)));
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let repo = InMemoryRepository::new();
        SessionSnapshotRecord::save(&repo, &snapshot()).await.unwrap();
        repo.set("unrelated", "1").await.unwrap();

        SessionSnapshotRecord::clear(&repo).await.unwrap();
        assert_eq!(repo.len().unwrap(), 1);
    }
}
