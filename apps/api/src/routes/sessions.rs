//! Axum route handlers for résumé upload, the interview and the download.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::session::{preview_extraction, run_interview};
use crate::state::AppState;

/// Multipart field carrying the résumé.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct AwaitingUpload {
    pub status: &'static str,
    pub message: &'static str,
}

const AWAITING_UPLOAD: AwaitingUpload = AwaitingUpload {
    status: "awaiting_upload",
    message: "Please upload a resume to begin.",
};

/// POST /api/v1/resumes/extract
///
/// Structures the uploaded résumé and returns it without starting the interview.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(pdf) = read_resume_upload(multipart).await? else {
        return Ok(Json(AWAITING_UPLOAD).into_response());
    };
    let record = preview_extraction(&state, pdf.to_vec()).await?;
    Ok(Json(record).into_response())
}

/// POST /api/v1/sessions
///
/// Runs the voice interview for the uploaded résumé and saves the result.
pub async fn handle_start_session(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(pdf) = read_resume_upload(multipart).await? else {
        return Ok(Json(AWAITING_UPLOAD).into_response());
    };
    let report = run_interview(&state, pdf.to_vec()).await?;
    Ok(Json(report).into_response())
}

/// GET /api/v1/record
///
/// Downloads the most recently saved record.
pub async fn handle_download_record(State(state): State<AppState>) -> Result<Response, AppError> {
    let bytes = state
        .store
        .load()
        .await?
        .ok_or_else(|| AppError::NotFound("No record has been saved yet".to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", state.store.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Returns the résumé bytes, or `None` when no file was chosen.
async fn read_resume_upload(mut multipart: Multipart) -> Result<Option<Bytes>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;

        // Browsers send an empty part when the file input is left blank.
        if data.is_empty() {
            return Ok(None);
        }
        if !looks_like_pdf(file_name.as_deref(), content_type.as_deref(), &data) {
            return Err(AppError::Validation(
                "Only PDF resumes are accepted".to_string(),
            ));
        }
        return Ok(Some(data));
    }
    Ok(None)
}

fn looks_like_pdf(file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) -> bool {
    let named_pdf = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    let typed_pdf = content_type == Some("application/pdf");
    named_pdf || typed_pdf || data.starts_with(b"%PDF-")
}
