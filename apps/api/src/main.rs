mod config;
mod dialogue;
mod document;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod session;
mod speech;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dialogue::classifier::LlmSlotClassifier;
use crate::document::PdfReader;
use crate::llm_client::{CompletionClient, OpenAiClient};
use crate::routes::build_router;
use crate::speech::endpoint::EndpointConfig;
use crate::speech::{CommandSpeaker, MicrophoneCapture, WhisperTranscriber};
use crate::state::AppState;
use crate::store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume interview v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    )?);
    info!(
        extraction_model = %config.extraction_model,
        classifier_model = %config.classifier_model,
        "LLM client initialized"
    );

    let classifier = Arc::new(LlmSlotClassifier::new(
        llm.clone(),
        config.classifier_model.clone(),
    ));

    // Initialize speech I/O
    let transcriber = Arc::new(WhisperTranscriber::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.transcription_model.clone(),
    )?);
    let capture = Arc::new(MicrophoneCapture::new(
        EndpointConfig::with_listen_timeout(config.listen_timeout),
        transcriber,
    ));
    let playback = Arc::new(CommandSpeaker::new(
        config.tts_command.clone(),
        config.speech_rate,
    ));
    info!(
        tts = %config.tts_command,
        wpm = config.speech_rate,
        listen_timeout_secs = config.listen_timeout.as_secs(),
        "Speech I/O initialized"
    );

    let store = RecordStore::new(config.output_path.clone());
    info!("Records will be saved to {}", store.path().display());

    // Build app state
    let state = AppState {
        config: config.clone(),
        reader: Arc::new(PdfReader),
        llm,
        classifier,
        capture,
        playback,
        store,
        interview_lock: Arc::new(tokio::sync::Mutex::new(())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
