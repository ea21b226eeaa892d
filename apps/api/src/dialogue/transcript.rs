use serde::Serialize;
use tracing::info;

use crate::dialogue::Slot;

/// One step of the voice interview, returned to the UI in place of inline notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DialogueEvent {
    Prompted { slot: Slot, text: String },
    Heard { slot: Slot, utterance: String },
    CaptureFailed { slot: Slot, reason: String },
    Rejected { slot: Slot, response: String },
    Accepted { slot: Slot, value: String },
    Closed { text: String },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    events: Vec<DialogueEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DialogueEvent) {
        match &event {
            DialogueEvent::Prompted { slot, text } => info!(%slot, "Asked: {text}"),
            DialogueEvent::Heard { slot, utterance } => info!(%slot, "You said: {utterance}"),
            DialogueEvent::CaptureFailed { slot, reason } => {
                info!(%slot, "No answer captured: {reason}")
            }
            DialogueEvent::Rejected { slot, response } => {
                info!(%slot, "Answer rejected: {response}")
            }
            DialogueEvent::Accepted { slot, value } => info!(%slot, "Answer accepted: {value}"),
            DialogueEvent::Closed { text } => info!("{text}"),
        }
        self.events.push(event);
    }

    #[cfg(test)]
    pub fn events(&self) -> &[DialogueEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<DialogueEvent> {
        self.events
    }
}
