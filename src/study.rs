//! Study room conveniences: reading content aloud, dictated notes and
//! bookmarks, all for one signed-in user.

use uuid::Uuid;

use crate::error::StudyError;
use crate::integrations::{AudioClip, SpeechSynthesizer, SpeechTranscriber};
use crate::models::StudyNote;
use crate::roles::UserContext;
use crate::store::PersistenceAdapter;

pub struct StudyRoom<P, S> {
    user: UserContext,
    store: P,
    speech: S,
}

impl<P, S> StudyRoom<P, S>
where
    P: PersistenceAdapter,
    S: SpeechSynthesizer + SpeechTranscriber,
{
    pub fn new(user: UserContext, store: P, speech: S) -> Self {
        Self {
            user,
            store,
            speech,
        }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub async fn read_aloud(&self, text: &str) -> Result<AudioClip, StudyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudyError::EmptyText);
        }
        Ok(self.speech.synthesize(text).await?)
    }

    /// Transcribes a voice note and stores the text against `content_id`.
    pub async fn dictate_note(
        &self,
        content_id: &str,
        audio: &AudioClip,
    ) -> Result<StudyNote, StudyError> {
        let transcript = self.speech.transcribe(audio).await?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(StudyError::EmptyTranscript);
        }

        tracing::debug!(user = %self.user.user_id, content = content_id, "dictated note");
        self.write_note(content_id, transcript).await
    }

    pub async fn write_note(&self, content_id: &str, text: &str) -> Result<StudyNote, StudyError> {
        Ok(self
            .store
            .save_note(&self.user.user_id, content_id, text)
            .await?)
    }

    pub async fn notes(&self, content_id: &str) -> Result<Vec<StudyNote>, StudyError> {
        Ok(self.store.load_notes(&self.user.user_id, content_id).await?)
    }

    pub async fn delete_note(&self, content_id: &str, note_id: Uuid) -> Result<bool, StudyError> {
        Ok(self
            .store
            .delete_note(&self.user.user_id, content_id, note_id)
            .await?)
    }

    pub async fn toggle_bookmark(&self, content_id: &str) -> Result<bool, StudyError> {
        Ok(self
            .store
            .toggle_bookmark(&self.user.user_id, content_id)
            .await?)
    }

    pub async fn is_bookmarked(&self, content_id: &str) -> Result<bool, StudyError> {
        Ok(self
            .store
            .is_bookmarked(&self.user.user_id, content_id)
            .await?)
    }
}
