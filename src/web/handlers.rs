use axum::{extract::State, http::StatusCode, response::Html, Json};
use tracing::debug;

use crate::{
    playground::{PlaygroundSnapshot, SettingsUpdate, SubmitOutcome},
    web::{
        types::{CancelResponse, SubmitOutcomeBody, SubmitRequest, SubmitResponse},
        AppState,
    },
};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn get_state(State(state): State<AppState>) -> Json<PlaygroundSnapshot> {
    Json(state.playground.snapshot().await)
}

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    let outcome = match state.playground.submit_prompt(req.prompt).await {
        SubmitOutcome::Completed(turn) => SubmitOutcomeBody::Completed { turn },
        SubmitOutcome::Ignored(reason) => {
            debug!(?reason, "submit ignored");
            SubmitOutcomeBody::Ignored { reason }
        }
    };

    Json(SubmitResponse {
        outcome,
        state: state.playground.snapshot().await,
    })
}

pub async fn cancel(State(state): State<AppState>) -> Json<CancelResponse> {
    let cancelled = state.playground.cancel().await;

    Json(CancelResponse {
        cancelled,
        state: state.playground.snapshot().await,
    })
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<PlaygroundSnapshot>, (StatusCode, String)> {
    let snapshot = state
        .playground
        .apply_settings(update)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(snapshot))
}
