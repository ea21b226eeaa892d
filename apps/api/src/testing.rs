//! Deterministic stand-ins for the microphone, speaker, classifier, completion
//! client and document reader.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Config;
use crate::dialogue::classifier::{Classification, SlotClassifier};
use crate::document::{DocumentError, DocumentReader};
use crate::llm_client::{CompletionClient, CompletionRequest, LlmError};
use crate::speech::{CaptureError, SpeechCapture, SpeechError, SpeechPlayback};
use crate::state::AppState;
use crate::store::RecordStore;

/// Extraction model reply for the Ada Lovelace résumé used across tests.
pub const ADA_EXTRACTION: &str = r#"{"First Name":"Ada","Last Name":"Lovelace","Current Role":"Engineer","Skillset":["Python"],"Relevant Skills":["SQL","Statistics","Docker","Kubernetes","Spark","TensorFlow","Git","Linux","AWS","Tableau"],"Skill Gap":6}"#;

/// Replays a fixed list of capture results; reports `NoSpeech` once exhausted.
pub struct ScriptedCapture {
    script: Mutex<VecDeque<Result<String, CaptureError>>>,
    calls: Mutex<usize>,
}

impl ScriptedCapture {
    pub fn new(script: Vec<Result<String, CaptureError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    async fn listen(&self) -> Result<String, CaptureError> {
        *self.calls.lock() += 1;
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Err(CaptureError::NoSpeech { waited_secs: 0 }))
    }
}

/// Holds every `listen` until `open` is called, then replays `inner`.
pub struct GatedCapture {
    gate: tokio::sync::Semaphore,
    inner: ScriptedCapture,
}

impl GatedCapture {
    pub fn new(script: Vec<Result<String, CaptureError>>) -> Self {
        Self {
            gate: tokio::sync::Semaphore::new(0),
            inner: ScriptedCapture::new(script),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(1024);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl SpeechCapture for GatedCapture {
    async fn listen(&self) -> Result<String, CaptureError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        self.inner.listen().await
    }
}

#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl SpeechPlayback for RecordingSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

/// Maps utterances to raw classifier responses; unknown utterances are `Invalid`.
pub struct ScriptedClassifier {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            responses: pairs
                .iter()
                .map(|(utterance, response)| (utterance.to_string(), response.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SlotClassifier for ScriptedClassifier {
    async fn classify(&self, utterance: &str) -> Result<Classification, LlmError> {
        self.calls.lock().push(utterance.to_string());
        let response = self
            .responses
            .get(utterance)
            .map(String::as_str)
            .unwrap_or("Invalid");
        Ok(Classification::parse(response))
    }
}

/// Returns the same completion for every request.
pub struct CannedCompletion(pub String);

#[async_trait]
impl CompletionClient for CannedCompletion {
    async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

/// Pretends every upload contains `text`.
pub struct FixedTextReader(pub String);

#[async_trait]
impl DocumentReader for FixedTextReader {
    async fn read(&self, _bytes: Vec<u8>) -> Result<String, DocumentError> {
        Ok(self.0.clone())
    }
}

pub fn test_config(dir: &Path) -> Config {
    Config {
        openai_api_key: "sk-test".to_string(),
        openai_base_url: "http://127.0.0.1:9/v1".to_string(),
        extraction_model: "gpt-3.5-turbo".to_string(),
        classifier_model: "gpt-4".to_string(),
        transcription_model: "whisper-1".to_string(),
        output_path: dir.join("user_data.json"),
        listen_timeout: Duration::from_secs(1),
        // Bounded so an exhausted script ends the test instead of spinning.
        max_attempts: Some(20),
        tts_command: "true".to_string(),
        speech_rate: 150,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// State wired entirely to fakes, saving under `dir`.
pub fn test_state(
    dir: &Path,
    extraction_reply: &str,
    capture: ScriptedCapture,
    classifier: &[(&str, &str)],
) -> AppState {
    test_state_with_capture(dir, extraction_reply, Arc::new(capture), classifier)
}

pub fn test_state_with_capture(
    dir: &Path,
    extraction_reply: &str,
    capture: Arc<dyn SpeechCapture>,
    classifier: &[(&str, &str)],
) -> AppState {
    let config = test_config(dir);
    AppState {
        store: RecordStore::new(config.output_path.clone()),
        config,
        reader: Arc::new(FixedTextReader(
            "Ada Lovelace\nEngineer\nSkills: Python".to_string(),
        )),
        llm: Arc::new(CannedCompletion(extraction_reply.to_string())),
        classifier: Arc::new(ScriptedClassifier::new(classifier)),
        capture,
        playback: Arc::new(RecordingSpeaker::default()),
        interview_lock: Arc::new(tokio::sync::Mutex::new(())),
    }
}
