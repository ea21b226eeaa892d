//! Session Record Store — merges the extracted résumé with the interview answers
//! and keeps the result in one JSON file, overwritten on every save.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::dialogue::SessionSlots;
use crate::extraction::ResumeRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("both target role and career goal must be captured before saving")]
    Incomplete,

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage task aborted: {0}")]
    Aborted(String),
}

/// What ends up on disk: every résumé field plus the two answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(flatten)]
    pub resume: ResumeRecord,
    #[serde(rename = "Target Role")]
    pub target_role: String,
    #[serde(rename = "Career Goal")]
    pub career_goal: String,
}

impl PersistedRecord {
    /// Fails unless both slots are filled.
    pub fn merge(resume: ResumeRecord, slots: &SessionSlots) -> Result<Self, StoreError> {
        match (&slots.target_role, &slots.goal) {
            (Some(target_role), Some(goal)) => Ok(Self {
                resume,
                target_role: target_role.clone(),
                career_goal: goal.clone(),
            }),
            _ => Err(StoreError::Incomplete),
        }
    }
}

/// Serializes with 4-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    Ok(bytes)
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "user_data.json".to_string())
    }

    /// Replaces the file with `record` in one rename and returns the bytes written.
    pub async fn save(&self, record: &PersistedRecord) -> Result<Vec<u8>, StoreError> {
        let bytes = to_pretty_json(record)?;
        let path = self.path.clone();

        let bytes = tokio::task::spawn_blocking(move || {
            write_atomically(&path, &bytes)?;
            Ok::<_, StoreError>(bytes)
        })
        .await
        .map_err(|e| StoreError::Aborted(e.to_string()))??;

        info!(path = %self.path.display(), bytes = bytes.len(), "Session record saved");
        Ok(bytes)
    }

    /// The saved file, or `None` if nothing has been saved yet.
    pub async fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
