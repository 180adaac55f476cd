use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

const SERVICE: &str = "ElevenLabs";
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
const TTS_MODEL: &str = "eleven_monolingual_v1";
const STT_MODEL: &str = "whisper-1";

/// Encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, IntegrationError>;
}

#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioClip) -> Result<String, IntegrationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.5,
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    text: String,
}

fn transport(source: reqwest::Error) -> IntegrationError {
    IntegrationError::Transport {
        service: SERVICE,
        source,
    }
}

/// Text-to-speech and speech-to-text over the ElevenLabs REST API.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: Option<String>,
        voice_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IntegrationError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(IntegrationError::MissingApiKey { service: SERVICE })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            api_key,
            base_url: ELEVENLABS_API_URL.to_string(),
            voice_id: voice_id.into(),
            voice_settings: VoiceSettings::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = settings;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn tts_url(&self) -> String {
        self.url(&format!("text-to-speech/{}", self.voice_id))
    }

    pub fn stt_url(&self) -> String {
        self.url("speech-to-text")
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, IntegrationError> {
        let body = TtsRequest {
            text,
            model_id: TTS_MODEL,
            voice_settings: self.voice_settings,
        };

        let response = self
            .client
            .post(self.tts_url())
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::Status {
                service: SERVICE,
                status,
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        tracing::debug!(chars = text.chars().count(), bytes = bytes.len(), "synthesized speech");
        Ok(AudioClip::new(bytes.to_vec(), "audio/mpeg"))
    }
}

#[async_trait]
impl SpeechTranscriber for ElevenLabsClient {
    async fn transcribe(&self, audio: &AudioClip) -> Result<String, IntegrationError> {
        let part = Part::bytes(audio.bytes.clone())
            .file_name("audio")
            .mime_str(&audio.mime_type)
            .map_err(transport)?;
        let form = Form::new().part("audio", part).text("model", STT_MODEL);

        let response = self
            .client
            .post(self.stt_url())
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::Status {
                service: SERVICE,
                status,
            });
        }

        let body: SttResponse = response.json().await.map_err(transport)?;
        Ok(body.text)
    }
}
