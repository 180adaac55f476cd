use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::integrations::speech::DEFAULT_VOICE_ID;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_PASSING_THRESHOLD: u32 = 70;

#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    pub voice_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    /// Percent needed to pass when a quiz does not set its own.
    pub passing_threshold: u32,
    pub store_path: PathBuf,
    pub log_file: PathBuf,
    pub request_timeout_seconds: u64,
    pub elevenlabs: ElevenLabsSettings,
}

impl Settings {
    /// Loads `.env`, then `config/{APP_ENV}.toml` if present, then
    /// `EVOLVE_*` environment overrides (`__` separates nested keys).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
        let file = config::File::with_name(&format!("config/{}", app_env)).required(false);

        let settings = Self::build(file, environment(None))?;
        Ok(settings.with_api_key_fallback(env::var("ELEVENLABS_API_KEY").ok()))
    }

    /// Uses the plain `ELEVENLABS_API_KEY` value when no layer set a key.
    fn with_api_key_fallback(mut self, fallback: Option<String>) -> Self {
        if self.elevenlabs.api_key.is_none() {
            self.elevenlabs.api_key = fallback;
        }
        self
    }

    fn build<S>(file: S, environment: config::Environment) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Settings = config::Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("passing_threshold", DEFAULT_PASSING_THRESHOLD as i64)?
            .set_default("store_path", "evolve-quiz-store.json")?
            .set_default("log_file", "evolve-quiz.log")?
            .set_default("request_timeout_seconds", 10_i64)?
            .set_default("elevenlabs.voice_id", DEFAULT_VOICE_ID)?
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.passing_threshold > 100 {
            return Err(ConfigError::Threshold(self.passing_threshold));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn environment(source: Option<HashMap<String, String>>) -> config::Environment {
    config::Environment::with_prefix("EVOLVE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn vars(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn no_file() -> File<config::FileSourceString, FileFormat> {
        File::from_str("", FileFormat::Toml)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::build(no_file(), environment(vars(&[]))).unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.passing_threshold, 70);
        assert_eq!(settings.store_path, PathBuf::from("evolve-quiz-store.json"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.elevenlabs.voice_id, DEFAULT_VOICE_ID);
        assert!(settings.elevenlabs.api_key.is_none());
    }

    #[test]
    fn test_file_then_environment() {
        let file = File::from_str(
            r#"
            passing_threshold = 60
            store_path = "/tmp/evolve.json"

            [elevenlabs]
            api_key = "from-file"
            "#,
            FileFormat::Toml,
        );
        let env = environment(vars(&[
            ("EVOLVE_PASSING_THRESHOLD", "85"),
            ("EVOLVE_ELEVENLABS__API_KEY", "from-env"),
        ]));

        let settings = Settings::build(file, env).unwrap();
        assert_eq!(settings.passing_threshold, 85);
        assert_eq!(settings.store_path, PathBuf::from("/tmp/evolve.json"));
        assert_eq!(settings.elevenlabs.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_rejects_threshold_above_100() {
        let env = environment(vars(&[("EVOLVE_PASSING_THRESHOLD", "101")]));
        assert!(matches!(
            Settings::build(no_file(), env),
            Err(ConfigError::Threshold(101))
        ));
    }

    #[test]
    fn test_plain_api_key_is_a_fallback() {
        let settings = Settings::build(no_file(), environment(vars(&[])))
            .unwrap()
            .with_api_key_fallback(Some("plain-key".to_string()));
        assert_eq!(settings.elevenlabs.api_key.as_deref(), Some("plain-key"));

        let env = environment(vars(&[("EVOLVE_ELEVENLABS__API_KEY", "layered-key")]));
        let settings = Settings::build(no_file(), env)
            .unwrap()
            .with_api_key_fallback(Some("plain-key".to_string()));
        assert_eq!(settings.elevenlabs.api_key.as_deref(), Some("layered-key"));
    }
}
