//! Slot classification — asks the classifier model whether an utterance is a
//! target role, a career goal, or neither.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::dialogue::Slot;
use crate::llm_client::{CompletionClient, CompletionRequest, LlmError};

pub const CLASSIFY_SYSTEM: &str = "You are a helpful assistant that extracts structured career \
information. Always respond in the format: Role: <role> or Goal: <goal>. If the input is unclear \
or not a job title or goal, just respond with: Invalid.";

/// Parsed classifier response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Classification {
    Role(String),
    Goal(String),
    Invalid,
}

impl Classification {
    /// Parses `Role: <value>`, `Goal: <value>` or anything else as `Invalid`.
    ///
    /// The keyword must lead the response and is matched case-insensitively;
    /// a keyword with an empty value is `Invalid`.
    pub fn parse(response: &str) -> Self {
        let Some((keyword, value)) = response.trim().split_once(':') else {
            return Classification::Invalid;
        };
        let value = value.trim();
        if value.is_empty() {
            return Classification::Invalid;
        }
        if keyword.eq_ignore_ascii_case(Slot::TargetRole.keyword()) {
            Classification::Role(value.to_string())
        } else if keyword.eq_ignore_ascii_case(Slot::CareerGoal.keyword()) {
            Classification::Goal(value.to_string())
        } else {
            Classification::Invalid
        }
    }

    /// The value if this classification answers `slot`.
    pub fn value_for(&self, slot: Slot) -> Option<&str> {
        match (self, slot) {
            (Classification::Role(value), Slot::TargetRole) => Some(value),
            (Classification::Goal(value), Slot::CareerGoal) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Role(value) => write!(f, "{}: {value}", Slot::TargetRole.keyword()),
            Classification::Goal(value) => write!(f, "{}: {value}", Slot::CareerGoal.keyword()),
            Classification::Invalid => f.write_str("Invalid"),
        }
    }
}

#[async_trait]
pub trait SlotClassifier: Send + Sync {
    async fn classify(&self, utterance: &str) -> Result<Classification, LlmError>;
}

/// Classifier backed by the completion client's stronger model.
pub struct LlmSlotClassifier {
    llm: Arc<dyn CompletionClient>,
    model: String,
}

impl LlmSlotClassifier {
    pub fn new(llm: Arc<dyn CompletionClient>, model: String) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl SlotClassifier for LlmSlotClassifier {
    async fn classify(&self, utterance: &str) -> Result<Classification, LlmError> {
        let response = self
            .llm
            .complete(&CompletionRequest {
                model: &self.model,
                system: Some(CLASSIFY_SYSTEM),
                prompt: utterance,
                temperature: None,
            })
            .await?;
        tracing::debug!(response = %response.trim(), "Classifier response");
        Ok(Classification::parse(&response))
    }
}
