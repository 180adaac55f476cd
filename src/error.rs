//! Error types, one enum per concern.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::quiz::AttemptStatus;

/// Errors raised by the quiz session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A transition was attempted from a state that does not allow it.
    #[error("cannot {operation} while the attempt is {status}")]
    InvalidState {
        operation: &'static str,
        status: AttemptStatus,
    },

    /// The question id does not belong to the current question set.
    #[error("question `{0}` is not part of this quiz")]
    UnknownQuestion(String),
}

/// Errors raised while loading a question set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("quiz `{0}` was not found")]
    NotFound(String),

    #[error("quiz service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid quiz document: {0}")]
    Invalid(String),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised by the persistence adapter and its key-value stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stored record under `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the AI and speech collaborators.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("{service} API key is not configured")]
    MissingApiKey { service: &'static str },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with status {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("passing threshold must be between 0 and 100, got {0}")]
    Threshold(u32),
}

/// Errors raised by the study room.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("nothing to read aloud")]
    EmptyText,

    #[error("transcription produced no text")]
    EmptyTranscript,

    #[error(transparent)]
    Speech(#[from] IntegrationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
