//! HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use odelia_engine::{
    Answer, DateSelectionRequest, DecisionRequest, DecisionSubmission, Envelope,
};

use crate::error::ServerError;
use crate::records::{ResponseCounts, ResponseStats};
use crate::AppState;

/// POST /api/response
pub async fn submit_response(
    State(state): State<AppState>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<Envelope>, ServerError> {
    let Json(request) = body?;
    let decision = request.validate()?;

    let id = record(&state, &decision).await;
    info!(id, answer = %decision.answer, "Response recorded");

    if decision.answer == Answer::Yes {
        let dodges = decision
            .metadata
            .as_ref()
            .and_then(|m| m.dodge_count)
            .unwrap_or(0);
        state.notifier.decision(dodges).await;
    }

    Ok(Json(
        Envelope::ok(format!("Response \"{}\" saved successfully!", decision.answer))
            .with_response_id(id),
    ))
}

/// Store the decision. A missing or failing store yields id 0.
async fn record(state: &AppState, decision: &DecisionSubmission) -> i64 {
    let Some(store) = state.store.clone() else {
        warn!("No response store configured, response not persisted");
        return 0;
    };
    let decision = decision.clone();
    let at = state.clock.now();
    match tokio::task::spawn_blocking(move || store.save(&decision, at)).await {
        Ok(Ok(id)) => id,
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to persist response");
            0
        }
        Err(e) => {
            warn!(error = %e, "Response store task failed");
            0
        }
    }
}

/// POST /api/date-selection
pub async fn submit_date_selection(
    State(state): State<AppState>,
    body: Result<Json<DateSelectionRequest>, JsonRejection>,
) -> Result<Json<Envelope>, ServerError> {
    let Json(request) = body?;
    let selection = request.validate()?;
    info!(
        restaurant = selection.top_restaurant(),
        activity = selection.top_activity(),
        "Date selection received"
    );

    state.notifier.date_selection(&selection).await;

    Ok(Json(Envelope::ok(format!(
        "Date selection \"{} + {}\" processed successfully!",
        selection.top_restaurant(),
        selection.top_activity()
    ))))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<ResponseStats>, ServerError> {
    let store = state.store.clone().ok_or(ServerError::StoreUnavailable)?;
    let counts: ResponseCounts = tokio::task::spawn_blocking(move || store.counts())
        .await
        .map_err(|e| crate::records::StoreError::Task(e.to_string()))??;
    Ok(Json(ResponseStats::new(counts, state.clock.now())))
}

pub async fn response_method_not_allowed() -> (StatusCode, Json<Envelope>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(Envelope::fail("Use POST to submit a response")),
    )
}

pub async fn date_selection_method_not_allowed() -> (StatusCode, Json<Envelope>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(Envelope::fail("Use POST to submit a date selection")),
    )
}
