//! Question set sources.
//!
//! This is the only place the quiz core reaches outside the process.

mod catalog;
mod file;
mod http;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::models::{Quiz, QuizSummary};

pub use catalog::{CatalogQuestionSource, DEMO_QUIZ_ID};
pub use file::{FileQuestionSource, load_quiz_from_json};
pub use http::HttpQuestionSource;

#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Loads a quiz by id, failing with `NotFound` or `ServiceUnavailable`.
    async fn load(&self, quiz_id: &str) -> Result<Quiz, LoadError>;

    /// Quizzes this source can load, ordered by id.
    async fn list(&self) -> Result<Vec<QuizSummary>, LoadError>;
}
