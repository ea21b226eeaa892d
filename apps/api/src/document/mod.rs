//! Document Reader — turns an uploaded résumé PDF into plain text.
//!
//! Pages are extracted individually; pages that yield no text are skipped and
//! the rest are joined with newlines in page order. An empty result is valid.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("PDF extraction aborted: {0}")]
    Aborted(String),
}

#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read(&self, bytes: Vec<u8>) -> Result<String, DocumentError>;
}

/// `DocumentReader` backed by `pdf-extract`.
pub struct PdfReader;

#[async_trait]
impl DocumentReader for PdfReader {
    async fn read(&self, bytes: Vec<u8>) -> Result<String, DocumentError> {
        read_document(bytes).await
    }
}

/// Extracts the text of every page of `bytes` and joins the non-empty ones.
///
/// Extraction is CPU-bound and `pdf-extract` may panic on malformed input, so it
/// runs on the blocking pool where a panic surfaces as a join error.
pub async fn read_document(bytes: Vec<u8>) -> Result<String, DocumentError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string()))
    })
    .await
    .map_err(|e| DocumentError::Aborted(e.to_string()))??;

    let page_count = pages.len();
    let text = join_page_texts(pages);

    if text.is_empty() {
        warn!(page_count, "No page of the uploaded document yielded text");
    } else {
        debug!(page_count, chars = text.len(), "Document text extracted");
    }

    Ok(text)
}

/// Joins page texts with `\n`, dropping pages that are empty or whitespace only.
pub fn join_page_texts<I>(pages: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let kept: Vec<String> = pages
        .into_iter()
        .filter(|page| !page.as_ref().trim().is_empty())
        .map(|page| page.as_ref().to_string())
        .collect();
    kept.join("\n")
}
