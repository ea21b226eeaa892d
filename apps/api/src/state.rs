use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::dialogue::classifier::SlotClassifier;
use crate::document::DocumentReader;
use crate::llm_client::CompletionClient;
use crate::speech::{SpeechCapture, SpeechPlayback};
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external service sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub reader: Arc<dyn DocumentReader>,
    pub llm: Arc<dyn CompletionClient>,
    pub classifier: Arc<dyn SlotClassifier>,
    pub capture: Arc<dyn SpeechCapture>,
    pub playback: Arc<dyn SpeechPlayback>,
    pub store: RecordStore,
    /// Held for the whole interview: there is one microphone and one speaker.
    pub interview_lock: Arc<Mutex<()>>,
}
