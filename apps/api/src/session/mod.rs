//! Interview session — the end-to-end flow for one uploaded résumé.
//!
//! Flow: read document → extract résumé fields → fill target role and career
//! goal by voice → merge → save → report back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dialogue::transcript::{DialogueEvent, Transcript};
use crate::dialogue::{run_dialogue, DialogueDeps, SessionSlots};
use crate::errors::AppError;
use crate::extraction::{extract_resume, ResumeRecord};
use crate::state::AppState;
use crate::store::PersistedRecord;

pub const DOWNLOAD_PATH: &str = "/api/v1/record";

/// Result of a completed interview, returned to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub record: PersistedRecord,
    pub transcript: Vec<DialogueEvent>,
    pub output_path: String,
    pub download_url: &'static str,
}

/// Reads and structures the résumé without starting the interview.
pub async fn preview_extraction(state: &AppState, pdf: Vec<u8>) -> Result<ResumeRecord, AppError> {
    let resume_text = state.reader.read(pdf).await?;
    extract_resume(&resume_text, state.llm.as_ref(), &state.config.extraction_model).await
}

/// Runs the full interview. Only one may run at a time.
///
/// The interview runs on its own task, which owns the lock guard: the lock is
/// held until the interview finishes even if the caller goes away.
pub async fn run_interview(state: &AppState, pdf: Vec<u8>) -> Result<SessionReport, AppError> {
    let guard = state
        .interview_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| AppError::SessionInProgress)?;

    let session_id = Uuid::new_v4();
    let state = state.clone();
    let interview = tokio::spawn(async move {
        let _guard = guard;
        let result = conduct_interview(&state, session_id, pdf).await;
        if let Err(e) = &result {
            warn!(%session_id, error = %e, "Interview ended without a saved record");
        }
        result
    });

    interview
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("interview task failed: {e}")))?
}

async fn conduct_interview(
    state: &AppState,
    session_id: Uuid,
    pdf: Vec<u8>,
) -> Result<SessionReport, AppError> {
    info!(%session_id, bytes = pdf.len(), "Interview started");

    let resume = preview_extraction(state, pdf).await?;

    let deps = DialogueDeps {
        capture: state.capture.as_ref(),
        playback: state.playback.as_ref(),
        classifier: state.classifier.as_ref(),
        max_attempts: state.config.max_attempts,
    };
    let mut transcript = Transcript::new();
    let slots = run_dialogue(&deps, SessionSlots::default(), &mut transcript).await?;

    let record = PersistedRecord::merge(resume, &slots)?;
    state.store.save(&record).await?;

    info!(
        %session_id,
        target_role = %record.target_role,
        career_goal = %record.career_goal,
        "Interview complete"
    );

    Ok(SessionReport {
        session_id,
        completed_at: Utc::now(),
        record,
        transcript: transcript.into_events(),
        output_path: state.store.path().display().to_string(),
        download_url: DOWNLOAD_PATH,
    })
}
