//! External services the study pages call. The quiz core does not use them.

pub mod ai;
pub mod speech;

pub use ai::{ContentGenerator, ContentRequest, ContentType, Difficulty, HttpContentGenerator};
pub use speech::{AudioClip, ElevenLabsClient, SpeechSynthesizer, SpeechTranscriber};
