//! JWT service for HS256 access tokens
//!
//! Tokens follow the claim layout GoTrue issues (`sub`, `aud`, `email`,
//! `user_metadata`), so the same service can mint tokens for the local
//! provider and verify GoTrue tokens without a network round trip.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Identity, IdentityError, IdentityResult};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HS256 secret
    pub secret: String,
    /// Expected and issued `aud` claim
    pub audience: String,
    /// Access token expiration time in seconds
    pub access_token_expiry: u64,
}

impl TokenConfig {
    /// Default audience of GoTrue-issued user tokens
    pub const AUTHENTICATED: &'static str = "authenticated";

    pub fn new(secret: impl Into<String>, access_token_expiry: u64) -> Self {
        Self {
            secret: secret.into(),
            audience: Self::AUTHENTICATED.to_string(),
            access_token_expiry,
        }
    }
}

/// User metadata embedded in the token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.sub,
            email: claims.email,
            name: claims.user_metadata.name,
        }
    }
}

/// Signs and validates access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&config.audience));
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Generate an access token for an identity
    pub fn issue(&self, identity: &Identity) -> IdentityResult<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: identity.id.clone(),
            aud: self.config.audience.clone(),
            iat: now,
            exp: now + self.config.access_token_expiry,
            email: identity.email.clone(),
            user_metadata: UserMetadata {
                name: identity.name.clone(),
            },
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Internal(format!("Failed to sign token: {}", e)))?;
        debug!(user_id = %identity.id, "access token issued");
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate(&self, token: &str) -> IdentityResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!("Failed to validate token: {}", e);
            IdentityError::InvalidToken
        })?;
        Ok(data.claims)
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}
