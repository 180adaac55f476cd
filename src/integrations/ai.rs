use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

const SERVICE: &str = "AI content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Lesson,
    Quiz,
    Explanation,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub prompt: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub max_length: Option<u32>,
}

impl ContentRequest {
    pub fn new(prompt: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            prompt: prompt.into(),
            content_type,
            difficulty: Difficulty::default(),
            max_length: Some(500),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Asks for an explanation of why `answer` is right for `question`.
    pub fn explain(question: &str, answer: &str) -> Self {
        Self::new(
            format!("Explain why \"{}\" is the answer to: {}", answer, question),
            ContentType::Explanation,
        )
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    #[serde(default)]
    tokens_used: u32,
}

/// Produces educational text. The returned string is opaque.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &ContentRequest) -> Result<String, IntegrationError>;
}

/// Calls `POST {base}/ai/generate` on the backend service.
#[derive(Debug, Clone)]
pub struct HttpContentGenerator {
    client: Client,
    base_url: String,
}

impl HttpContentGenerator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| IntegrationError::Transport {
                service: SERVICE,
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/ai/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<String, IntegrationError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|source| IntegrationError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::Status {
                service: SERVICE,
                status,
            });
        }

        let body: ContentResponse =
            response
                .json()
                .await
                .map_err(|source| IntegrationError::Transport {
                    service: SERVICE,
                    source,
                })?;

        tracing::debug!(tokens = body.tokens_used, "generated content");
        Ok(body.content)
    }
}
