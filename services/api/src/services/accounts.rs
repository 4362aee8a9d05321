//! Signup, sign-in and the caller's own profile

use identity::{
    NewAccount, Session,
    validation::{validate_email, validate_name, validate_password},
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Profile, ProfileView, Role, SigninRequest, SignupRequest},
    policy::{Action, Actor},
    state::AppState,
};

/// Create an account at the identity provider and store its student profile
///
/// Self-service accounts are always students; staff are provisioned by
/// writing their profiles directly.
pub async fn signup(state: &AppState, req: SignupRequest) -> ApiResult<Profile> {
    let email = req.email.trim().to_lowercase();
    let name = req.name.trim().to_string();
    validate_email(&email)?;
    validate_password(&req.password)?;
    validate_name(&name)?;

    let identity = state
        .identity
        .create_user(&NewAccount {
            email: email.clone(),
            password: req.password,
            name: name.clone(),
            role: Role::Student.to_string(),
        })
        .await?;

    let profile = Profile::new_student(identity.id, email, name);
    state.profiles.save(&profile).await?;

    info!(user_id = %profile.id, "student signed up");
    Ok(profile)
}

/// Exchange credentials for a provider session
pub async fn signin(state: &AppState, req: SigninRequest) -> ApiResult<Session> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid("Email and password are required"));
    }

    let session = state.identity.sign_in(&email, &req.password).await?;
    info!(user_id = %session.user.id, "user signed in");
    Ok(session)
}

/// The caller's stored profile, or the provider's view when none exists
pub async fn profile(state: &AppState, user: AuthUser) -> ApiResult<ProfileView> {
    let AuthUser(identity) = user;
    match state.profiles.get(&identity.id).await? {
        Some(profile) => {
            Actor::new(profile.id.clone(), profile.role)
                .ensure_profile(Action::ViewProfile, &profile)?;
            Ok(ProfileView::Stored(profile))
        }
        None => Ok(ProfileView::Identity(identity)),
    }
}
