//! Authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use scisync_common::AppResult;
use scisync_core::{CreateUserInput, LoginInput};
use serde::Serialize;

use crate::{middleware::AppState, response::UserResponse};

/// Signup/login response: profile plus a fresh API token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let user = state.user_service.create(input).await?;

    let token = user.token.clone().unwrap_or_default();
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Log in with email and password.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let user = state.user_service.authenticate(&input).await?;

    let token = user.token.clone().unwrap_or_default();
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}
