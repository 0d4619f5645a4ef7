use crate::domain::models::AdminUser;
use crate::state::SharedState;
use crate::store::AuthError;
use crate::web::{api_error, ApiError};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub sector: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub name: String,
    pub sector: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

fn auth_error(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingFields | AuthError::PasswordMismatch => {
            api_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        AuthError::DuplicateName => api_error(StatusCode::CONFLICT, err.to_string()),
        AuthError::InvalidCredentials => api_error(StatusCode::UNAUTHORIZED, err.to_string()),
        AuthError::Store(e) => {
            tracing::error!("admin store failure: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist account")
        }
    }
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.password != payload.confirm_password {
        return Err(auth_error(AuthError::PasswordMismatch));
    }
    state
        .admins
        .register(AdminUser {
            name: payload.name,
            sector: payload.sector,
            password: payload.password,
        })
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::CREATED)
}

async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .admins
        .login(&payload.name, &payload.password)
        .await
        .map_err(auth_error)?;
    tracing::info!(name = %user.name, "staff login");
    Ok(Json(LoginResponse {
        name: user.name,
        sector: user.sector,
    }))
}
