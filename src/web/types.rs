use serde::{Deserialize, Serialize};

use crate::playground::{IgnoreReason, PlaygroundSnapshot, Turn};

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitOutcomeBody {
    Completed { turn: Turn },
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcomeBody,
    pub state: PlaygroundSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
    pub state: PlaygroundSnapshot,
}
