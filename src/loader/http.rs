use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::LoadError;
use crate::models::{Quiz, QuizDocument, QuizSummary};

use super::QuestionSource;

/// Fetches quizzes from the REST service with `GET {base}/quizzes/{id}`
/// and lists them with `GET {base}/quizzes`.
#[derive(Debug, Clone)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: String,
}

impl HttpQuestionSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::ServiceUnavailable(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn quiz_url(&self, quiz_id: &str) -> String {
        format!("{}/{}", self.quizzes_url(), quiz_id)
    }

    pub fn quizzes_url(&self) -> String {
        format!("{}/quizzes", self.base_url.trim_end_matches('/'))
    }

    async fn fetch(&self, url: &str, quiz_id: &str) -> Result<reqwest::Response, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "quiz fetch failed");
            return Err(status_error(status, quiz_id));
        }
        Ok(response)
    }
}

/// Summaries of the valid documents in a listing, ordered by id.
fn summarize(documents: Vec<QuizDocument>) -> Vec<QuizSummary> {
    let mut summaries: Vec<QuizSummary> = documents
        .into_iter()
        .filter_map(|document| {
            let id = document.id.clone();
            match Quiz::try_from(document) {
                Ok(quiz) => Some(QuizSummary::from(&quiz)),
                Err(err) => {
                    tracing::warn!(quiz = %id, "skipping listed quiz: {}", err);
                    None
                }
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.id.cmp(&b.id));
    summaries
}

/// Maps a non-success status to a load error.
fn status_error(status: StatusCode, quiz_id: &str) -> LoadError {
    if status == StatusCode::NOT_FOUND {
        LoadError::NotFound(quiz_id.to_string())
    } else {
        LoadError::ServiceUnavailable(format!("quiz service answered {}", status))
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn load(&self, quiz_id: &str) -> Result<Quiz, LoadError> {
        let url = self.quiz_url(quiz_id);
        tracing::debug!(%url, "fetching quiz");

        let document: QuizDocument = self
            .fetch(&url, quiz_id)
            .await?
            .json()
            .await
            .map_err(|e| LoadError::Invalid(format!("malformed quiz response: {}", e)))?;

        Quiz::try_from(document)
    }

    async fn list(&self) -> Result<Vec<QuizSummary>, LoadError> {
        let url = self.quizzes_url();
        tracing::debug!(%url, "listing quizzes");

        let documents: Vec<QuizDocument> = self
            .fetch(&url, "quizzes")
            .await?
            .json()
            .await
            .map_err(|e| LoadError::Invalid(format!("malformed quiz listing: {}", e)))?;

        Ok(summarize(documents))
    }
}
