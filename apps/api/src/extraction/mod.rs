//! Résumé Extraction — structures raw résumé text into a `ResumeRecord` via the
//! extraction model.
//!
//! A response that does not decode into the record is fatal for the session;
//! there is no repair pass and no retry with a stricter prompt.

pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::prompts::RESUME_EXTRACT_PROMPT;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, CompletionClient, CompletionRequest, LlmError};

/// Low temperature keeps extraction deterministic.
const EXTRACTION_TEMPERATURE: f32 = 0.1;
pub const RELEVANT_SKILL_COUNT: usize = 10;
pub const MAX_SKILL_GAP: u8 = 10;

/// Structured fields pulled out of one résumé.
///
/// Serialized with the human-readable keys written to the output file; the
/// snake_case names are accepted as aliases when decoding model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(rename = "First Name", alias = "first_name")]
    pub first_name: String,
    #[serde(rename = "Last Name", alias = "last_name")]
    pub last_name: String,
    #[serde(rename = "Current Role", alias = "current_role")]
    pub current_role: String,
    #[serde(rename = "Skillset", alias = "skills")]
    pub skills: Vec<String>,
    #[serde(rename = "Relevant Skills", alias = "relevant_skills")]
    pub relevant_skills: Vec<String>,
    /// 0 = no gap, 10 = complete gap.
    #[serde(rename = "Skill Gap", alias = "skill_gap")]
    pub skill_gap: u8,
}

impl ResumeRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Asks the extraction model to structure `resume_text` and validates the result.
pub async fn extract_resume(
    resume_text: &str,
    llm: &dyn CompletionClient,
    model: &str,
) -> Result<ResumeRecord, AppError> {
    let prompt = RESUME_EXTRACT_PROMPT.replace("{resume_text}", resume_text);
    let request = CompletionRequest {
        model,
        system: Some(JSON_ONLY_SYSTEM),
        prompt: &prompt,
        temperature: Some(EXTRACTION_TEMPERATURE),
    };

    let record: ResumeRecord = complete_json(llm, &request).await.map_err(|e| match e {
        LlmError::Parse(parse) => {
            AppError::ExtractionParse(format!("model output is not a resume record: {parse}"))
        }
        other => AppError::Llm(format!("Resume extraction failed: {other}")),
    })?;

    validate_record(&record)?;

    info!(
        name = %record.full_name(),
        current_role = %record.current_role,
        skill_gap = record.skill_gap,
        "Resume fields extracted"
    );
    Ok(record)
}

fn validate_record(record: &ResumeRecord) -> Result<(), AppError> {
    if record.skill_gap > MAX_SKILL_GAP {
        return Err(AppError::ExtractionParse(format!(
            "skill gap {} is outside 0-{MAX_SKILL_GAP}",
            record.skill_gap
        )));
    }
    if record.relevant_skills.len() != RELEVANT_SKILL_COUNT {
        warn!(
            count = record.relevant_skills.len(),
            "Expected {RELEVANT_SKILL_COUNT} relevant skills from extraction"
        );
    }
    Ok(())
}
