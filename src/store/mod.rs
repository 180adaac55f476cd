//! Attempt history, notes and bookmarks.
//!
//! The quiz core talks to [`PersistenceAdapter`] only. Saving is best
//! effort: a failed call is reported to the caller and never touches the
//! in-memory attempt.

mod kv;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Bookmark, QuizResult, StudyNote};

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn save_attempt_result(
        &self,
        user_id: &str,
        quiz_id: &str,
        result: &QuizResult,
    ) -> Result<(), StoreError>;

    /// Stored results, most recent last.
    async fn load_attempt_history(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<QuizResult>, StoreError>;

    async fn save_note(
        &self,
        user_id: &str,
        content_id: &str,
        text: &str,
    ) -> Result<StudyNote, StoreError>;

    async fn load_notes(&self, user_id: &str, content_id: &str)
    -> Result<Vec<StudyNote>, StoreError>;

    /// Returns whether a note was removed.
    async fn delete_note(
        &self,
        user_id: &str,
        content_id: &str,
        note_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Flips the bookmark and returns its new state.
    async fn toggle_bookmark(&self, user_id: &str, content_id: &str) -> Result<bool, StoreError>;

    async fn is_bookmarked(&self, user_id: &str, content_id: &str) -> Result<bool, StoreError>;
}

// `%` and `:` are escaped so two different id pairs never share a key.
fn escape(id: &str) -> String {
    id.replace('%', "%25").replace(':', "%3A")
}

fn results_key(user_id: &str, quiz_id: &str) -> String {
    format!("results:{}:{}", escape(user_id), escape(quiz_id))
}

fn notes_key(user_id: &str, content_id: &str) -> String {
    format!("notes:{}:{}", escape(user_id), escape(content_id))
}

fn bookmark_key(user_id: &str, content_id: &str) -> String {
    format!("bookmark:{}:{}", escape(user_id), escape(content_id))
}

/// Persistence over a [`KeyValueStore`], one JSON record per key.
pub struct LocalPersistence<K> {
    store: K,
    // Serializes read-modify-write cycles on list records.
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore> LocalPersistence<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw)
    }
}

impl LocalPersistence<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

#[async_trait]
impl<K: KeyValueStore> PersistenceAdapter for LocalPersistence<K> {
    async fn save_attempt_result(
        &self,
        user_id: &str,
        quiz_id: &str,
        result: &QuizResult,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = results_key(user_id, quiz_id);

        let mut history: Vec<QuizResult> = self.read(&key)?.unwrap_or_default();
        history.push(result.clone());
        self.write(&key, &history)?;

        tracing::info!(
            user = user_id,
            quiz = quiz_id,
            attempt = %result.attempt_id,
            attempts = history.len(),
            "result saved"
        );
        Ok(())
    }

    async fn load_attempt_history(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<QuizResult>, StoreError> {
        Ok(self.read(&results_key(user_id, quiz_id))?.unwrap_or_default())
    }

    async fn save_note(
        &self,
        user_id: &str,
        content_id: &str,
        text: &str,
    ) -> Result<StudyNote, StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = notes_key(user_id, content_id);

        let note = StudyNote::new(content_id, text);
        let mut notes: Vec<StudyNote> = self.read(&key)?.unwrap_or_default();
        notes.push(note.clone());
        self.write(&key, &notes)?;

        tracing::debug!(user = user_id, content = content_id, note = %note.id, "note saved");
        Ok(note)
    }

    async fn load_notes(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> Result<Vec<StudyNote>, StoreError> {
        Ok(self.read(&notes_key(user_id, content_id))?.unwrap_or_default())
    }

    async fn delete_note(
        &self,
        user_id: &str,
        content_id: &str,
        note_id: Uuid,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = notes_key(user_id, content_id);

        let mut notes: Vec<StudyNote> = self.read(&key)?.unwrap_or_default();
        let before = notes.len();
        notes.retain(|n| n.id != note_id);
        if notes.len() == before {
            return Ok(false);
        }

        if notes.is_empty() {
            self.store.remove(&key)?;
        } else {
            self.write(&key, &notes)?;
        }
        Ok(true)
    }

    async fn toggle_bookmark(&self, user_id: &str, content_id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = bookmark_key(user_id, content_id);

        let current = self
            .read::<Bookmark>(&key)?
            .is_some_and(|b| b.bookmarked);
        let bookmark = Bookmark {
            content_id: content_id.to_string(),
            bookmarked: !current,
            updated_at: Utc::now(),
        };
        self.write(&key, &bookmark)?;
        Ok(bookmark.bookmarked)
    }

    async fn is_bookmarked(&self, user_id: &str, content_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .read::<Bookmark>(&bookmark_key(user_id, content_id))?
            .is_some_and(|b| b.bookmarked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Completion;

    fn result(percent: u32) -> QuizResult {
        QuizResult {
            attempt_id: Uuid::new_v4(),
            quiz_id: "quiz1".into(),
            total_questions: 4,
            correct_count: (percent / 25) as usize,
            score_percent: percent,
            points_earned: percent / 25,
            points_possible: 4,
            pass: percent >= 70,
            time_spent_seconds: 42,
            completion: Completion::Submitted,
            completed_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_history_keeps_order() {
        let store = LocalPersistence::in_memory();
        let first = result(50);
        let second = result(75);

        store.save_attempt_result("u1", "quiz1", &first).await.unwrap();
        store.save_attempt_result("u1", "quiz1", &second).await.unwrap();

        let history = store.load_attempt_history("u1", "quiz1").await.unwrap();
        assert_eq!(history, vec![first, second]);
        assert!(store.load_attempt_history("u2", "quiz1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notes_are_scoped_by_user_and_content() {
        let store = LocalPersistence::in_memory();
        let note = store.save_note("u1", "algebra-1", "x = 4").await.unwrap();
        store.save_note("u1", "algebra-2", "other").await.unwrap();
        store.save_note("u2", "algebra-1", "someone else").await.unwrap();

        let notes = store.load_notes("u1", "algebra-1").await.unwrap();
        assert_eq!(notes, vec![note.clone()]);

        assert!(store.delete_note("u1", "algebra-1", note.id).await.unwrap());
        assert!(!store.delete_note("u1", "algebra-1", note.id).await.unwrap());
        assert!(store.load_notes("u1", "algebra-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bookmark_toggles() {
        let store = LocalPersistence::in_memory();
        assert!(!store.is_bookmarked("u1", "c1").await.unwrap());
        assert!(store.toggle_bookmark("u1", "c1").await.unwrap());
        assert!(store.is_bookmarked("u1", "c1").await.unwrap());
        assert!(!store.toggle_bookmark("u1", "c1").await.unwrap());
        assert!(!store.is_bookmarked("u1", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported() {
        let store = LocalPersistence::in_memory();
        store
            .store()
            .set("results:u1:quiz1", "not json".to_string())
            .unwrap();

        let err = store.load_attempt_history("u1", "quiz1").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_keys_escape_separators() {
        assert_eq!(results_key("u1", "quiz1"), "results:u1:quiz1");
        assert_eq!(results_key("a:b", "c"), "results:a%3Ab:c");
        assert_eq!(results_key("a", "b:c"), "results:a:b%3Ac");
        assert_ne!(notes_key("a%3Ab", "c"), notes_key("a:b", "c"));
    }

    #[tokio::test]
    async fn test_colon_in_ids_does_not_share_records() {
        let store = LocalPersistence::in_memory();
        store.save_attempt_result("a:b", "c", &result(100)).await.unwrap();
        store.save_note("a:b", "c", "mine").await.unwrap();
        store.toggle_bookmark("a:b", "c").await.unwrap();

        assert!(store.load_attempt_history("a", "b:c").await.unwrap().is_empty());
        assert!(store.load_notes("a", "b:c").await.unwrap().is_empty());
        assert!(!store.is_bookmarked("a", "b:c").await.unwrap());
        assert_eq!(store.load_attempt_history("a:b", "c").await.unwrap().len(), 1);
    }
}
