//! Slot-Filling Dialogue Loop — asks, listens, classifies and re-asks until
//! each required slot holds an accepted answer.
//!
//! Per slot: `Empty -(capture fails)-> Empty`,
//! `Empty -(wrong keyword | Invalid)-> Empty`, `Empty -(matching keyword)-> Filled`.
//!
//! A failed capture goes straight back to the prompt: the classifier is not
//! consulted and no "invalid answer" re-prompt is spoken. A missing or broken
//! input device ends the dialogue instead.

pub mod classifier;
pub mod transcript;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::dialogue::classifier::SlotClassifier;
use crate::dialogue::transcript::{DialogueEvent, Transcript};
use crate::llm_client::LlmError;
use crate::speech::{CaptureError, SpeechCapture, SpeechError, SpeechPlayback};

pub const CLOSING_ACKNOWLEDGMENT: &str =
    "Thank you for sharing. Your information has been recorded.";

/// A required piece of information collected by voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    TargetRole,
    CareerGoal,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::TargetRole, Slot::CareerGoal];

    /// Leading keyword the classifier uses for answers to this slot.
    pub fn keyword(self) -> &'static str {
        match self {
            Slot::TargetRole => "Role",
            Slot::CareerGoal => "Goal",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Slot::TargetRole => "What is your target role?",
            Slot::CareerGoal => "What is your long-term career goal?",
        }
    }

    pub fn reprompt(self) -> &'static str {
        match self {
            Slot::TargetRole => {
                "That didn't seem like a valid role. Please say a specific job title."
            }
            Slot::CareerGoal => "Please try again and describe your long-term career goal clearly.",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Slot::TargetRole => "target role",
            Slot::CareerGoal => "career goal",
        })
    }
}

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("no valid {slot} after {attempts} attempts")]
    AttemptsExhausted { slot: Slot, attempts: u32 },

    #[error("{0} is already filled")]
    SlotAlreadyFilled(Slot),

    #[error("microphone unavailable: {0}")]
    Capture(CaptureError),

    #[error("classification failed: {0}")]
    Classifier(#[from] LlmError),

    #[error("playback failed: {0}")]
    Playback(#[from] SpeechError),
}

/// The two answers collected in one session. Each slot is written once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSlots {
    pub target_role: Option<String>,
    pub goal: Option<String>,
}

impl SessionSlots {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::TargetRole => self.target_role.as_deref(),
            Slot::CareerGoal => self.goal.as_deref(),
        }
    }

    pub fn fill(&mut self, slot: Slot, value: String) -> Result<(), DialogueError> {
        let entry = match slot {
            Slot::TargetRole => &mut self.target_role,
            Slot::CareerGoal => &mut self.goal,
        };
        if entry.is_some() {
            return Err(DialogueError::SlotAlreadyFilled(slot));
        }
        *entry = Some(value);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.target_role.is_some() && self.goal.is_some()
    }
}

/// The collaborators one interview talks to.
#[derive(Clone, Copy)]
pub struct DialogueDeps<'a> {
    pub capture: &'a dyn SpeechCapture,
    pub playback: &'a dyn SpeechPlayback,
    pub classifier: &'a dyn SlotClassifier,
    /// `None` asks until an answer is accepted. Capture failures count as attempts.
    pub max_attempts: Option<u32>,
}

async fn say(
    deps: &DialogueDeps<'_>,
    transcript: &mut Transcript,
    slot: Slot,
    text: &str,
) -> Result<(), DialogueError> {
    transcript.record(DialogueEvent::Prompted {
        slot,
        text: text.to_string(),
    });
    deps.playback.speak(text).await?;
    Ok(())
}

/// Fills `slot`, returning the accepted (trimmed) value.
pub async fn fill_slot(
    deps: &DialogueDeps<'_>,
    slots: &mut SessionSlots,
    slot: Slot,
    transcript: &mut Transcript,
) -> Result<String, DialogueError> {
    let mut attempts = 0u32;

    loop {
        if deps.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(DialogueError::AttemptsExhausted { slot, attempts });
        }
        attempts += 1;

        say(deps, transcript, slot, slot.prompt()).await?;

        let utterance = match deps.capture.listen().await {
            Ok(utterance) => utterance,
            Err(e) if !e.is_retryable() => return Err(DialogueError::Capture(e)),
            Err(e) => {
                transcript.record(DialogueEvent::CaptureFailed {
                    slot,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        transcript.record(DialogueEvent::Heard {
            slot,
            utterance: utterance.clone(),
        });

        let classification = deps.classifier.classify(&utterance).await?;

        if let Some(value) = classification.value_for(slot) {
            let value = value.trim().to_string();
            slots.fill(slot, value.clone())?;
            transcript.record(DialogueEvent::Accepted {
                slot,
                value: value.clone(),
            });
            deps.playback.speak(&value).await?;
            info!(%slot, attempts, "Slot filled");
            return Ok(value);
        }

        transcript.record(DialogueEvent::Rejected {
            slot,
            response: classification.to_string(),
        });
        say(deps, transcript, slot, slot.reprompt()).await?;
    }
}

/// Fills every empty slot in order, then speaks the closing acknowledgment.
pub async fn run_dialogue(
    deps: &DialogueDeps<'_>,
    mut slots: SessionSlots,
    transcript: &mut Transcript,
) -> Result<SessionSlots, DialogueError> {
    for slot in Slot::ALL {
        if slots.get(slot).is_none() {
            fill_slot(deps, &mut slots, slot, transcript).await?;
        }
    }

    debug_assert!(slots.is_complete());
    transcript.record(DialogueEvent::Closed {
        text: CLOSING_ACKNOWLEDGMENT.to_string(),
    });
    deps.playback.speak(CLOSING_ACKNOWLEDGMENT).await?;

    Ok(slots)
}
