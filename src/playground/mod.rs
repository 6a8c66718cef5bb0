//! Playground controller: conversation history plus the A/B settings surface.

pub mod params;
pub mod turn;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::client::{GenerationClient, GenerationRequest, Model};

pub use params::{
    Lane, ParamError, ParamSet, ParamUpdate, FIXED_MAX_TOKENS, TEMPERATURE_RANGE, TOP_P_RANGE,
};
pub use turn::{LaneOutputs, Turn, TurnStatus, ERROR_OUTPUT};

use turn::Settlement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyPrompt,
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    Completed(Turn),
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelOption {
    pub value: Model,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaygroundSnapshot {
    pub prompt: String,
    pub model: Model,
    pub in_flight: bool,
    pub pending_turn: Option<Uuid>,
    pub history: Vec<Turn>,
    pub params_a: ParamSet,
    pub params_b: ParamSet,
    pub settings_open: bool,
    pub compare_enabled: bool,
    pub models: Vec<ModelOption>,
}

/// Partial settings change. Lane values are validated together before any
/// field is stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub model: Option<Model>,
    #[serde(default)]
    pub compare_enabled: Option<bool>,
    #[serde(default)]
    pub settings_open: Option<bool>,
    #[serde(default)]
    pub lane_a: Option<ParamUpdate>,
    #[serde(default)]
    pub lane_b: Option<ParamUpdate>,
}

struct InFlight {
    turn_id: Uuid,
    cancel: watch::Sender<bool>,
}

struct PendingSubmission {
    turn: Turn,
    lane_a: GenerationRequest,
    lane_b: Option<GenerationRequest>,
    cancelled: watch::Receiver<bool>,
}

struct PlaygroundState {
    prompt: String,
    model: Model,
    in_flight: Option<InFlight>,
    history: Vec<Turn>,
    params_a: ParamSet,
    params_b: ParamSet,
    settings_open: bool,
    compare_enabled: bool,
}

impl Default for PlaygroundState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: Model::default(),
            in_flight: None,
            history: Vec::new(),
            params_a: ParamSet::lane_defaults(Lane::A),
            params_b: ParamSet::lane_defaults(Lane::B),
            settings_open: false,
            compare_enabled: false,
        }
    }
}

impl PlaygroundState {
    fn params_mut(&mut self, lane: Lane) -> &mut ParamSet {
        match lane {
            Lane::A => &mut self.params_a,
            Lane::B => &mut self.params_b,
        }
    }

    fn request_for(&self, prompt: &str, params: ParamSet) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            model: self.model,
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        }
    }

    /// Guard check plus the synchronous half of a submission: clear the
    /// prompt, take the in-flight slot, append the pending turn.
    fn begin(&mut self) -> Result<PendingSubmission, IgnoreReason> {
        if self.prompt.trim().is_empty() {
            return Err(IgnoreReason::EmptyPrompt);
        }
        if self.in_flight.is_some() {
            return Err(IgnoreReason::Busy);
        }

        let prompt = std::mem::take(&mut self.prompt);
        let turn = Turn::pending(prompt);
        let (cancel, cancelled) = watch::channel(false);

        self.in_flight = Some(InFlight {
            turn_id: turn.id,
            cancel,
        });
        self.history.push(turn.clone());

        let lane_a = self.request_for(&turn.prompt, self.params_a);
        let lane_b = self
            .compare_enabled
            .then(|| self.request_for(&turn.prompt, self.params_b));

        Ok(PendingSubmission {
            turn,
            lane_a,
            lane_b,
            cancelled,
        })
    }

    fn settle(&mut self, mut turn: Turn, settlement: Settlement) -> Turn {
        turn.apply(settlement);

        match self.history.iter_mut().find(|entry| entry.id == turn.id) {
            Some(entry) => *entry = turn.clone(),
            None => warn!(turn_id = %turn.id, "settled turn missing from history"),
        }

        if self
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.turn_id == turn.id)
        {
            self.in_flight = None;
        }

        turn
    }

    fn snapshot(&self) -> PlaygroundSnapshot {
        PlaygroundSnapshot {
            prompt: self.prompt.clone(),
            model: self.model,
            in_flight: self.in_flight.is_some(),
            pending_turn: self.in_flight.as_ref().map(|flight| flight.turn_id),
            history: self.history.clone(),
            params_a: self.params_a,
            params_b: self.params_b,
            settings_open: self.settings_open,
            compare_enabled: self.compare_enabled,
            models: Model::ALL
                .iter()
                .map(|&value| ModelOption {
                    value,
                    label: value.label(),
                })
                .collect(),
        }
    }
}

pub struct Playground {
    client: GenerationClient,
    state: Mutex<PlaygroundState>,
}

impl Playground {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            state: Mutex::new(PlaygroundState::default()),
        }
    }

    pub async fn snapshot(&self) -> PlaygroundSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn history(&self) -> Vec<Turn> {
        self.state.lock().await.history.clone()
    }

    pub async fn is_in_flight(&self) -> bool {
        self.state.lock().await.in_flight.is_some()
    }

    pub async fn prompt(&self) -> String {
        self.state.lock().await.prompt.clone()
    }

    pub async fn set_prompt(&self, text: impl Into<String>) {
        self.state.lock().await.prompt = text.into();
    }

    /// Submits the current prompt. Resolves once every lane request has
    /// settled, failed or been cancelled.
    ///
    /// The lane requests run on their own task, so dropping the returned
    /// future does not strand the turn or the in-flight marker.
    pub async fn submit(self: &Arc<Self>) -> SubmitOutcome {
        let pending = self.state.lock().await.begin();
        self.dispatch(pending).await
    }

    /// Sets the prompt and submits it without releasing the state lock in
    /// between.
    pub async fn submit_prompt(self: &Arc<Self>, text: impl Into<String>) -> SubmitOutcome {
        let pending = {
            let mut state = self.state.lock().await;
            state.prompt = text.into();
            state.begin()
        };
        self.dispatch(pending).await
    }

    /// Aborts the in-flight submission, if any.
    pub async fn cancel(&self) -> bool {
        let state = self.state.lock().await;
        match &state.in_flight {
            Some(flight) => {
                info!(turn_id = %flight.turn_id, "cancelling submission");
                flight.cancel.send_replace(true);
                true
            }
            None => false,
        }
    }

    pub async fn model(&self) -> Model {
        self.state.lock().await.model
    }

    pub async fn set_model(&self, model: Model) {
        self.state.lock().await.model = model;
    }

    pub async fn params(&self, lane: Lane) -> ParamSet {
        *self.state.lock().await.params_mut(lane)
    }

    pub async fn set_temperature(&self, lane: Lane, value: f32) -> Result<f32, ParamError> {
        self.state.lock().await.params_mut(lane).set_temperature(value)
    }

    pub async fn set_top_p(&self, lane: Lane, value: f32) -> Result<f32, ParamError> {
        self.state.lock().await.params_mut(lane).set_top_p(value)
    }

    pub async fn compare_enabled(&self) -> bool {
        self.state.lock().await.compare_enabled
    }

    /// Lane B's parameters survive disabling and come back on re-enable.
    pub async fn set_compare_enabled(&self, enabled: bool) {
        self.state.lock().await.compare_enabled = enabled;
    }

    pub async fn toggle_compare(&self) -> bool {
        let mut state = self.state.lock().await;
        state.compare_enabled = !state.compare_enabled;
        state.compare_enabled
    }

    pub async fn set_settings_open(&self, open: bool) {
        self.state.lock().await.settings_open = open;
    }

    /// Applies a settings change under a single lock. A rejected lane value
    /// leaves every field untouched.
    pub async fn apply_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<PlaygroundSnapshot, ParamError> {
        let mut state = self.state.lock().await;

        let params_a = match &update.lane_a {
            Some(changes) => state.params_a.updated(changes)?,
            None => state.params_a,
        };
        let params_b = match &update.lane_b {
            Some(changes) => state.params_b.updated(changes)?,
            None => state.params_b,
        };

        state.params_a = params_a;
        state.params_b = params_b;
        if let Some(model) = update.model {
            state.model = model;
        }
        if let Some(enabled) = update.compare_enabled {
            state.compare_enabled = enabled;
        }
        if let Some(open) = update.settings_open {
            state.settings_open = open;
        }

        Ok(state.snapshot())
    }

    async fn dispatch(
        self: &Arc<Self>,
        pending: Result<PendingSubmission, IgnoreReason>,
    ) -> SubmitOutcome {
        let pending = match pending {
            Ok(pending) => pending,
            Err(reason) => return SubmitOutcome::Ignored(reason),
        };

        let fallback = pending.turn.clone();
        let playground = Arc::clone(self);
        let task = tokio::spawn(async move { playground.run(pending).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(turn_id = %fallback.id, error = %err, "submission task aborted");
                let turn = self.state.lock().await.settle(fallback, Settlement::Failed);
                SubmitOutcome::Completed(turn)
            }
        }
    }

    async fn run(&self, pending: PendingSubmission) -> SubmitOutcome {
        let PendingSubmission {
            turn,
            lane_a,
            lane_b,
            mut cancelled,
        } = pending;

        let lanes = if lane_b.is_some() { 2 } else { 1 };
        info!(
            turn_id = %turn.id,
            model = ?lane_a.model,
            lanes,
            "submission started"
        );

        let requests = async {
            let first = self.client.generate(&lane_a);
            let second = async {
                match &lane_b {
                    Some(request) => self.client.generate(request).await,
                    None => Ok(String::new()),
                }
            };
            tokio::try_join!(first, second)
        };

        let cancel_signal = async {
            let sender_gone = cancelled.wait_for(|cancel| *cancel).await.is_err();
            if sender_gone {
                std::future::pending::<()>().await;
            }
        };

        let settlement = tokio::select! {
            result = requests => match result {
                Ok((a, b)) => Settlement::Settled(LaneOutputs { a, b }),
                Err(err) => {
                    error!(turn_id = %turn.id, error = %err, "generation failed");
                    Settlement::Failed
                }
            },
            () = cancel_signal => Settlement::Cancelled,
        };

        let turn = self.state.lock().await.settle(turn, settlement);
        info!(turn_id = %turn.id, status = ?turn.status, "submission finished");

        SubmitOutcome::Completed(turn)
    }
}
