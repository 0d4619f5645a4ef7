use crate::domain::models::{EvaluationCategory, RatingLevel, CATEGORIES};
use crate::domain::wizard::{WizardError, WizardEvent, WizardSnapshot};
use crate::state::SharedState;
use crate::web::{api_error, ApiError};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One button on the kiosk rating scale.
#[derive(Serialize)]
pub struct RatingOption {
    pub level: RatingLevel,
    pub emoji: &'static str,
    pub label: &'static str,
}

#[derive(Deserialize)]
pub struct OverallPayload {
    pub level: RatingLevel,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentPayload {
    pub apartment_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub category_id: String,
    pub level: RatingLevel,
}

#[derive(Deserialize)]
pub struct CommentsPayload {
    pub comments: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/state", get(snapshot))
        .route("/categories", get(categories))
        .route("/ratings", get(ratings))
        .route("/start", post(start))
        .route("/overall", post(set_overall))
        .route("/apartment", post(set_apartment))
        .route("/category", post(rate_category))
        .route("/comments", post(set_comments))
        .route("/advance", post(advance))
        .route("/reset", post(reset))
        .route("/events", get(next_event))
        .with_state(state)
}

fn wizard_error(err: WizardError) -> ApiError {
    match err {
        WizardError::Incomplete => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, "current step is not complete")
        }
        WizardError::UnknownCategory(id) => {
            api_error(StatusCode::BAD_REQUEST, format!("unknown category: {id}"))
        }
        WizardError::Store(e) => {
            tracing::error!("failed to persist feedback: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to save feedback")
        }
    }
}

async fn snapshot(State(state): State<SharedState>) -> Json<WizardSnapshot> {
    Json(state.wizard.snapshot().await)
}

async fn categories() -> Json<Vec<EvaluationCategory>> {
    Json(CATEGORIES.clone())
}

async fn ratings() -> Json<Vec<RatingOption>> {
    let scale = [
        RatingLevel::VeryUnsatisfied,
        RatingLevel::Unsatisfied,
        RatingLevel::Neutral,
        RatingLevel::Satisfied,
        RatingLevel::Excellent,
    ];
    Json(
        scale
            .into_iter()
            .map(|level| RatingOption {
                level,
                emoji: level.emoji(),
                label: level.label(),
            })
            .collect(),
    )
}

async fn start(State(state): State<SharedState>) -> Json<WizardSnapshot> {
    state.wizard.start().await;
    Json(state.wizard.snapshot().await)
}

async fn set_overall(
    State(state): State<SharedState>,
    Json(payload): Json<OverallPayload>,
) -> Json<WizardSnapshot> {
    state.wizard.set_overall(payload.level).await;
    Json(state.wizard.snapshot().await)
}

async fn set_apartment(
    State(state): State<SharedState>,
    Json(payload): Json<ApartmentPayload>,
) -> Json<WizardSnapshot> {
    state.wizard.set_apartment(payload.apartment_number).await;
    Json(state.wizard.snapshot().await)
}

async fn rate_category(
    State(state): State<SharedState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    state
        .wizard
        .rate_category(&payload.category_id, payload.level)
        .await
        .map_err(wizard_error)?;
    Ok(Json(state.wizard.snapshot().await))
}

async fn set_comments(
    State(state): State<SharedState>,
    Json(payload): Json<CommentsPayload>,
) -> Json<WizardSnapshot> {
    state.wizard.set_comments(payload.comments).await;
    Json(state.wizard.snapshot().await)
}

async fn advance(State(state): State<SharedState>) -> Result<Json<WizardSnapshot>, ApiError> {
    state.wizard.advance().await.map_err(wizard_error)?;
    Ok(Json(state.wizard.snapshot().await))
}

async fn reset(State(state): State<SharedState>) -> Json<WizardSnapshot> {
    state.wizard.reset().await;
    Json(state.wizard.snapshot().await)
}

/// Long-poll for the next UI hint (focus scrolling). 204 when nothing
/// happens within the poll window.
async fn next_event(
    State(state): State<SharedState>,
) -> Result<Json<WizardEvent>, StatusCode> {
    let mut events = state.wizard.subscribe();
    match tokio::time::timeout(Duration::from_secs(25), events.recv()).await {
        Ok(Ok(event)) => Ok(Json(event)),
        _ => Err(StatusCode::NO_CONTENT),
    }
}
