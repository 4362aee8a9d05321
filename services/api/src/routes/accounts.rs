//! Account routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::{
    error::ApiResult,
    middleware::{ApiJson, AuthUser},
    models::{ProfileResponse, SigninRequest, SignupRequest, SignupResponse},
    services::accounts,
    state::AppState,
};

/// Register a student account
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = accounts::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user })))
}

/// Sign in with email and password
#[instrument(skip_all)]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = accounts::signin(&state, payload).await?;
    Ok(Json(session))
}

/// The caller's profile
#[instrument(skip_all, fields(user_id = %user.0.id))]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user = accounts::profile(&state, user).await?;
    Ok(Json(ProfileResponse { user }))
}
