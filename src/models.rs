use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// The kinds of graded tasks the generation service may produce.
///
/// Serde names match the JSON contract used by the generation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "fill-in-blank")]
    FillBlank,
    #[serde(rename = "drag-drop")]
    DragDrop,
    #[serde(rename = "correct-mistake")]
    CorrectMistake,
    #[serde(rename = "translation")]
    Translation,
}

/// One graded question unit. Immutable once created; a batch is always
/// replaced wholesale, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "answer")]
    pub expected_answer: String,
    pub explanation: String,
}

impl Task {
    /// Required-field validation for generated tasks. Items failing this
    /// are dropped at the gateway boundary rather than surfaced.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.prompt.trim().is_empty()
            && !self.expected_answer.trim().is_empty()
            && !self.explanation.trim().is_empty()
    }
}

/// A practice sentence: Polish source plus the reference English pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentencePair {
    #[serde(rename = "pl")]
    pub source: String,
    #[serde(rename = "en")]
    pub reference: String,
}

/// Grading outcome captured when an answer is checked. The explanation
/// comes from the task data itself, not from the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Tutor,
}

/// One chat turn. History is append-only; the bounded context window sent
/// to the gateway is a derived suffix, never the full history.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Persisted learner progress, owned by the progress store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProgress {
    pub completed_sections: Vec<String>,
    pub quiz_scores: std::collections::HashMap<String, u32>,
}

/// Work items sent to the gateway worker thread.
///
/// `generation` stamps let a component discard responses that arrive after
/// its state has moved on (there is no true cancellation primitive).
#[derive(Debug, Clone)]
pub enum GatewayRequest {
    TaskBatch {
        generation: u64,
        topic: String,
    },
    SentencePair {
        generation: u64,
    },
    Analyze {
        generation: u64,
        source: String,
        reference: String,
        candidate: String,
    },
    Translate {
        generation: u64,
        text: String,
    },
    Converse {
        context: Vec<ConversationTurn>,
        message: String,
    },
}

/// Results flowing back from the worker. The embedding event loop routes
/// each variant to the component that issued the matching request.
#[derive(Debug)]
pub enum GatewayResponse {
    TaskBatch {
        generation: u64,
        result: Result<Vec<Task>, GatewayError>,
    },
    SentencePair {
        generation: u64,
        result: Result<SentencePair, GatewayError>,
    },
    Analysis {
        generation: u64,
        result: Result<String, GatewayError>,
    },
    Translation {
        generation: u64,
        result: Result<String, GatewayError>,
    },
    Reply {
        result: Result<String, GatewayError>,
    },
}
