use crate::domain::models::{ConnectionState, PostgresConfig};
use crate::domain::sync::SyncError;
use crate::state::SharedState;
use crate::web::{api_error, ApiError};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub state: ConnectionState,
    pub config: PostgresConfig,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub enriched: usize,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/connection", get(connection))
        .route("/connection/config", post(save_config))
        .route("/connection/test", post(test_connection))
        .route("/sync", post(sync_guest_data))
        .with_state(state)
}

fn sync_error(err: SyncError) -> ApiError {
    match err {
        SyncError::MissingFields => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        SyncError::NotConnected => api_error(StatusCode::PRECONDITION_FAILED, err.to_string()),
        SyncError::Busy => api_error(StatusCode::CONFLICT, err.to_string()),
        SyncError::MalformedBatch | SyncError::Directory(_) => {
            api_error(StatusCode::BAD_GATEWAY, err.to_string())
        }
        SyncError::Store(e) => {
            tracing::error!("feedback store failure during sync: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist enriched records")
        }
    }
}

async fn connection(State(state): State<SharedState>) -> Result<Json<ConnectionResponse>, ApiError> {
    let config = state.config.load().map_err(|e| {
        tracing::error!("failed to load connection config: {e}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load connection config")
    })?;
    Ok(Json(ConnectionResponse {
        state: state.sync.connection_state().await,
        config,
    }))
}

/// Saving the config never touches the live connection state.
async fn save_config(
    State(state): State<SharedState>,
    Json(config): Json<PostgresConfig>,
) -> Result<StatusCode, ApiError> {
    state.config.save(&config).map_err(|e| {
        tracing::error!("failed to save connection config: {e}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to save connection config")
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn test_connection(
    State(state): State<SharedState>,
    Json(config): Json<PostgresConfig>,
) -> Result<Json<ConnectionState>, ApiError> {
    state.sync.test_connection(&config).await.map_err(sync_error)?;
    Ok(Json(state.sync.connection_state().await))
}

async fn sync_guest_data(State(state): State<SharedState>) -> Result<Json<SyncResponse>, ApiError> {
    let enriched = state.sync.sync_guest_data().await.map_err(sync_error)?;
    Ok(Json(SyncResponse { enriched }))
}
