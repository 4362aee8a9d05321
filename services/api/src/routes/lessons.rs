//! Lesson routes

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::{
    error::ApiResult,
    middleware::ApiJson,
    models::{
        CreateLessonRequest, DeletedResponse, LessonResponse, LessonsResponse, UpdateLessonRequest,
    },
    policy::Actor,
    services::lessons,
    state::AppState,
};

/// Lessons visible to the caller
#[instrument(skip(state))]
pub async fn list_lessons(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    let lessons = lessons::list_lessons(&state, &actor).await?;
    Ok(Json(LessonsResponse { lessons }))
}

/// Get a lesson by id
#[instrument(skip(state))]
pub async fn get_lesson(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let lesson = lessons::get_lesson(&state, &actor, &id).await?;
    Ok(Json(LessonResponse { lesson }))
}

/// Schedule a lesson
#[instrument(skip(state, payload))]
pub async fn create_lesson(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(payload): ApiJson<CreateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    let lesson = lessons::create_lesson(&state, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(LessonResponse { lesson })))
}

/// Edit a lesson
#[instrument(skip(state, payload))]
pub async fn update_lesson(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    let lesson = lessons::update_lesson(&state, &actor, &id, payload).await?;
    Ok(Json(LessonResponse { lesson }))
}

/// Delete a lesson
#[instrument(skip(state))]
pub async fn delete_lesson(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    lessons::delete_lesson(&state, &actor, &id).await?;
    Ok(Json(DeletedResponse { success: true }))
}
