use crate::state::SharedState;
use crate::store::BrandingError;
use crate::web::{api_error, ApiError};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
pub struct BrandingResponse {
    pub logo: Option<String>,
}

#[derive(Deserialize)]
pub struct BrandingPayload {
    pub logo: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(current).post(update))
        .route("/watch", get(watch))
        .with_state(state)
}

async fn current(State(state): State<SharedState>) -> Json<BrandingResponse> {
    Json(BrandingResponse {
        logo: state.branding.current(),
    })
}

async fn update(
    State(state): State<SharedState>,
    Json(payload): Json<BrandingPayload>,
) -> Result<StatusCode, ApiError> {
    state.branding.set(payload.logo).map_err(|e| match e {
        BrandingError::InvalidDataUri => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        BrandingError::Store(e) => {
            tracing::error!("failed to persist branding asset: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to save branding asset")
        }
    })?;
    tracing::info!("branding asset updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Long-poll until the brand mark changes; every displaying component
/// re-reads on notification. 204 when nothing changed in the poll window.
async fn watch(State(state): State<SharedState>) -> Result<Json<BrandingResponse>, StatusCode> {
    let mut rx = state.branding.subscribe();
    match tokio::time::timeout(Duration::from_secs(25), rx.changed()).await {
        Ok(Ok(())) => Ok(Json(BrandingResponse {
            logo: rx.borrow().clone(),
        })),
        _ => Err(StatusCode::NO_CONTENT),
    }
}
