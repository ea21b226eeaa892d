pub mod health;
pub mod sessions;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::session::DOWNLOAD_PATH;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::upload_page))
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/extract", post(sessions::handle_extract))
        .route("/api/v1/sessions", post(sessions::handle_start_session))
        .route(DOWNLOAD_PATH, get(sessions::handle_download_record))
        // Résumés of any size are accepted.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, ScriptedCapture, ADA_EXTRACTION};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "resume-interview-test-boundary";

    fn multipart_request(
        uri: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Request<Body> {
        form_request(uri, "resume", file_name, content_type, data)
    }

    fn form_request(
        uri: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn interview_state(dir: &std::path::Path) -> AppState {
        let capture = ScriptedCapture::new(vec![
            Ok("I want to be a data scientist".into()),
            Ok("lead a research team".into()),
        ]);
        test_state(
            dir,
            ADA_EXTRACTION,
            capture,
            &[
                ("I want to be a data scientist", "Role: data scientist"),
                ("lead a research team", "Goal: lead a research team"),
            ],
        )
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "resume-interview");
    }

    #[tokio::test]
    async fn test_upload_page_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&html).contains("name=\"resume\""));
    }

    #[tokio::test]
    async fn test_session_without_file_waits_for_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = interview_state(dir.path());
        let app = build_router(state.clone());

        let response = app
            .oneshot(multipart_request(
                "/api/v1/sessions",
                "",
                "application/octet-stream",
                b"",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "awaiting_upload");
        assert_eq!(body["message"], "Please upload a resume to begin.");
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_form_without_resume_field_waits_for_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = interview_state(dir.path());
        let app = build_router(state.clone());

        let response = app
            .oneshot(form_request(
                "/api/v1/sessions",
                "cover_letter",
                "letter.pdf",
                "application/pdf",
                b"%PDF-1.4 fake",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "awaiting_upload");
        assert_eq!(body["message"], "Please upload a resume to begin.");
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));

        let response = app
            .oneshot(multipart_request(
                "/api/v1/resumes/extract",
                "resume.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                b"PK\x03\x04",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_previews_resume_fields() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));

        let response = app
            .oneshot(multipart_request(
                "/api/v1/resumes/extract",
                "ada.pdf",
                "application/pdf",
                b"%PDF-1.4 fake",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["First Name"], "Ada");
        assert_eq!(body["Skill Gap"], 6);
    }

    #[tokio::test]
    async fn test_session_then_download_returns_saved_record() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/v1/sessions",
                "ada.pdf",
                "application/pdf",
                b"%PDF-1.4 fake",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["record"]["Target Role"], "data scientist");
        assert_eq!(report["download_url"], DOWNLOAD_PATH);

        let response = app
            .oneshot(Request::get(DOWNLOAD_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(disposition, "attachment; filename=\"user_data.json\"");
        let saved = body_json(response).await;
        assert_eq!(saved["Career Goal"], "lead a research team");
    }

    #[tokio::test]
    async fn test_download_before_any_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(interview_state(dir.path()));
        let response = app
            .oneshot(Request::get(DOWNLOAD_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
