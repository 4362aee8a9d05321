//! Authentication middleware and request extractors

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use identity::Identity;
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    policy::Actor,
    state::AppState,
};

/// Identity resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Authentication middleware
///
/// Resolves the bearer token with the identity provider and stores the
/// result as an [`AuthUser`] request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let identity = state.identity.authenticate(bearer.token()).await?;
    debug!(user_id = %identity.id, "request authenticated");

    req.extensions_mut().insert(AuthUser(identity));
    Ok(next.run(req).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> ApiResult<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// The authenticated caller together with their stored role
///
/// Callers without a profile are refused here, so every handler taking an
/// `Actor` is closed to them.
#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        let profile = state.profiles.get(&identity.id).await?.ok_or_else(|| {
            warn!(user_id = %identity.id, "authenticated user has no profile");
            ApiError::forbidden("Profile not found")
        })?;

        Ok(Actor::new(profile.id, profile.role))
    }
}

/// JSON body extractor whose rejections render as `{error}`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
