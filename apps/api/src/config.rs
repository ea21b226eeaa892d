use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if the API key is missing or a numeric variable does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub extraction_model: String,
    pub classifier_model: String,
    pub transcription_model: String,
    pub output_path: PathBuf,
    pub listen_timeout: Duration,
    /// `None` keeps asking until an answer is accepted.
    pub max_attempts: Option<u32>,
    pub tts_command: String,
    pub speech_rate: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            extraction_model: env_or("EXTRACTION_MODEL", "gpt-3.5-turbo"),
            classifier_model: env_or("CLASSIFIER_MODEL", "gpt-4"),
            transcription_model: env_or("TRANSCRIPTION_MODEL", "whisper-1"),
            output_path: PathBuf::from(env_or("OUTPUT_PATH", "user_data.json")),
            listen_timeout: Duration::from_secs(
                env_or("LISTEN_TIMEOUT_SECS", "15")
                    .parse::<u64>()
                    .context("LISTEN_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            max_attempts: parse_max_attempts(std::env::var("MAX_ATTEMPTS").ok().as_deref())?,
            tts_command: env_or("TTS_COMMAND", "espeak"),
            speech_rate: env_or("SPEECH_RATE", "150")
                .parse::<u32>()
                .context("SPEECH_RATE must be words per minute")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset, empty or `0` means unbounded.
fn parse_max_attempts(raw: Option<&str>) -> Result<Option<u32>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let attempts = value
                .parse::<u32>()
                .context("MAX_ATTEMPTS must be a positive integer")?;
            Ok((attempts > 0).then_some(attempts))
        }
    }
}
