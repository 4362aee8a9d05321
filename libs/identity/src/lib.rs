//! Identity provider clients
//!
//! Authentication is owned by an external identity provider. This crate
//! exposes the part of it the API needs behind the [`IdentityProvider`]
//! trait. Two implementations exist: a GoTrue (Supabase auth) HTTP client
//! and an in-process provider for local development and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gotrue;
pub mod jwt;
pub mod local;
pub mod validation;

pub use gotrue::{GoTrueClient, GoTrueConfig};
pub use jwt::{TokenConfig, TokenService};
pub use local::LocalIdentity;

/// Opaque user identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Account creation payload
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Role recorded in the provider's user metadata
    pub role: String,
}

/// Session returned by a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub user: Identity,
}

/// Errors raised by identity providers
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The bearer token is missing, malformed, expired or revoked
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The provider refused the request (duplicate email, bad credentials, ...)
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached or failed
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// Local failure while talking to the provider
    #[error("Identity error: {0}")]
    Internal(String),
}

/// Type alias for Result with IdentityError
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Client for the external identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate a bearer token and return the identity it belongs to
    async fn authenticate(&self, token: &str) -> IdentityResult<Identity>;

    /// Create a confirmed account
    async fn create_user(&self, account: &NewAccount) -> IdentityResult<Identity>;

    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}
