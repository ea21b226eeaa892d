use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use tracing::warn;

use crate::speech::{CaptureError, Transcriber};

const TRANSCRIBE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Speech-to-text over an OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct WhisperTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(TRANSCRIBE_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, CaptureError> {
        let file_part = multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| CaptureError::ServiceUnavailable(e.to_string()))?;
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", file_part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Transcription request failed");
                CaptureError::ServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Transcription service returned non-success status");
            return Err(CaptureError::ServiceUnavailable(format!("status {status}")));
        }

        let payload: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| CaptureError::ServiceUnavailable(e.to_string()))?;

        let text = payload.text.trim();
        if text.is_empty() {
            return Err(CaptureError::Unrecognized);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn test_transcribe_posts_model_and_file() {
        let router = Router::new().route(
            "/v1/audio/transcriptions",
            post(|mut multipart: Multipart| async move {
                let mut model = String::new();
                let mut file_len = 0;
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().map(str::to_string);
                    match name.as_deref() {
                        Some("model") => model = field.text().await.unwrap(),
                        Some("file") => file_len = field.bytes().await.unwrap().len(),
                        _ => {}
                    }
                }
                Json(json!({ "text": format!(" {model}:{file_len} ") }))
            }),
        );
        let base = spawn_api(router).await;
        let transcriber =
            WhisperTranscriber::new("sk-test".into(), base, "whisper-1".into()).unwrap();

        let text = transcriber.transcribe(vec![1, 2, 3, 4]).await.unwrap();
        assert_eq!(text, "whisper-1:4");
    }

    #[tokio::test]
    async fn test_blank_transcript_is_unrecognized() {
        let router = Router::new().route(
            "/v1/audio/transcriptions",
            post(|| async { Json(json!({ "text": "   " })) }),
        );
        let base = spawn_api(router).await;
        let transcriber = WhisperTranscriber::new("k".into(), base, "m".into()).unwrap();

        let err = transcriber.transcribe(vec![0]).await.unwrap_err();
        assert_eq!(err, CaptureError::Unrecognized);
    }

    #[tokio::test]
    async fn test_server_error_is_service_unavailable() {
        let router = Router::new().route(
            "/v1/audio/transcriptions",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = spawn_api(router).await;
        let transcriber = WhisperTranscriber::new("k".into(), base, "m".into()).unwrap();

        let err = transcriber.transcribe(vec![0]).await.unwrap_err();
        assert!(matches!(err, CaptureError::ServiceUnavailable(_)));
    }
}
