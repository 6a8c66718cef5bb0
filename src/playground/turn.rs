use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in lane A when either lane's request fails.
pub const ERROR_OUTPUT: &str = "⚠️ Error generating response.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneOutputs {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
}

impl LaneOutputs {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Pending,
    Settled,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub prompt: String,
    pub outputs: LaneOutputs,
    pub status: TurnStatus,
    pub created_ts: i64,
}

#[derive(Debug)]
pub(crate) enum Settlement {
    Settled(LaneOutputs),
    Failed,
    Cancelled,
}

impl Turn {
    pub(crate) fn pending(prompt: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            outputs: LaneOutputs::default(),
            status: TurnStatus::Pending,
            created_ts: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }

    pub(crate) fn apply(&mut self, settlement: Settlement) {
        let (outputs, status) = match settlement {
            Settlement::Settled(outputs) => (outputs, TurnStatus::Settled),
            Settlement::Failed => (LaneOutputs::new(ERROR_OUTPUT, ""), TurnStatus::Failed),
            Settlement::Cancelled => (LaneOutputs::default(), TurnStatus::Cancelled),
        };
        self.outputs = outputs;
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_serialize_with_lane_letters() {
        let value = serde_json::to_value(LaneOutputs::new("x", "y")).unwrap();
        assert_eq!(value, serde_json::json!({ "A": "x", "B": "y" }));
    }

    #[test]
    fn failure_collapses_both_lanes() {
        let mut turn = Turn::pending("ping".into());
        turn.apply(Settlement::Failed);
        assert_eq!(turn.outputs, LaneOutputs::new(ERROR_OUTPUT, ""));
        assert_eq!(turn.status, TurnStatus::Failed);
    }
}
