//! Speech I/O — microphone capture with speech-to-text, and local text-to-speech.
//!
//! The dialogue loop only sees the `SpeechCapture` and `SpeechPlayback` traits;
//! `AppState` carries them as trait objects so tests can swap in fakes.

pub mod capture;
pub mod endpoint;
pub mod playback;
pub mod transcribe;

use async_trait::async_trait;
use thiserror::Error;

pub use capture::MicrophoneCapture;
pub use playback::CommandSpeaker;
pub use transcribe::WhisperTranscriber;

/// Why one listen attempt produced no transcript. Silence, unintelligible
/// audio and an unreachable recognizer are recoverable: the dialogue loop asks
/// again. A device error is not.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    #[error("no speech detected within {waited_secs}s")]
    NoSpeech { waited_secs: u64 },

    #[error("could not understand audio")]
    Unrecognized,

    #[error("speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("audio input device error: {0}")]
    Device(String),
}

impl CaptureError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CaptureError::Device(_))
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start TTS command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TTS command '{program}' exited with {status}")]
    Playback { program: String, status: String },
}

/// Captures one utterance and returns its transcript.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    async fn listen(&self) -> Result<String, CaptureError>;
}

/// Speaks `text`, returning once playback has finished.
#[async_trait]
pub trait SpeechPlayback: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Turns one recorded utterance (WAV bytes) into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, CaptureError>;
}
