//! API service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::{middleware::auth_middleware, state::AppState};

pub mod accounts;
pub mod lessons;
pub mod students;

/// Create the router for the API service
///
/// With a `base_path` every route, health included, lives under it.
pub fn create_router(state: AppState, base_path: Option<&str>) -> Router {
    let protected_routes = Router::new()
        .route("/user/profile", get(accounts::profile))
        .route("/students", get(students::list_students))
        .route("/students/:id/assign", post(students::assign_student))
        .route(
            "/students/:id/change-teacher",
            post(students::change_teacher),
        )
        .route("/students/:id/balance", post(students::update_balance))
        .route("/teachers", get(students::list_teachers))
        .route(
            "/lessons",
            get(lessons::list_lessons).post(lessons::create_lesson),
        )
        .route(
            "/lessons/:id",
            get(lessons::get_lesson)
                .put(lessons::update_lesson)
                .delete(lessons::delete_lesson),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(accounts::signup))
        .route("/auth/signin", post(accounts::signin))
        .merge(protected_routes);

    let router = match base_path {
        Some(prefix) => Router::new().nest(prefix, api),
        None => api,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.store.backend();
    match state.store.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "api",
                "store": backend,
            })),
        ),
        Ok(false) | Err(_) => {
            error!(backend, "store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "service": "api",
                    "store": backend,
                })),
            )
        }
    }
}
