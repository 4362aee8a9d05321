//! Student directory, assignment and balance routes

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::{
    error::ApiResult,
    middleware::ApiJson,
    models::{
        AssignRequest, AssignmentResponse, BalanceRequest, BalanceResponse, ChangeTeacherRequest,
        TeachersResponse,
    },
    policy::Actor,
    services::{assignment, balance, directory},
    state::AppState,
};

/// List students visible to the caller
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(directory::list_students(&state, &actor).await?))
}

/// List teachers and admins
#[instrument(skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    let teachers = directory::list_teachers(&state, &actor).await?;
    Ok(Json(TeachersResponse { teachers }))
}

/// Assign a student to a teacher and subject
#[instrument(skip(state, payload))]
pub async fn assign_student(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<AssignRequest>,
) -> ApiResult<impl IntoResponse> {
    let student = assignment::assign_student(&state, &actor, &id, payload).await?;
    Ok(Json(AssignmentResponse {
        success: true,
        student,
    }))
}

/// Move a student to another teacher
#[instrument(skip(state, payload))]
pub async fn change_teacher(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ChangeTeacherRequest>,
) -> ApiResult<impl IntoResponse> {
    let student = assignment::change_teacher(&state, &actor, &id, payload).await?;
    Ok(Json(AssignmentResponse {
        success: true,
        student,
    }))
}

/// Add to or set a student's balance
#[instrument(skip(state))]
pub async fn update_balance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BalanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let balance = balance::update_balance(&state, &actor, &id, payload).await?;
    Ok(Json(BalanceResponse { balance }))
}
