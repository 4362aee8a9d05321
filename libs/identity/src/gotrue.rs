//! GoTrue (Supabase auth) HTTP client
//!
//! Talks to the provider's REST API with the service-role key:
//! `GET /auth/v1/user` to resolve a token, `POST /auth/v1/admin/users` to
//! create confirmed accounts and `POST /auth/v1/token?grant_type=password`
//! to sign in. When the project's JWT secret is configured, tokens are
//! verified locally instead of calling `/user`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::{
    Identity, IdentityError, IdentityProvider, IdentityResult, NewAccount, Session,
    jwt::{TokenConfig, TokenService},
};

/// GoTrue client configuration
#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    /// Project base URL, e.g. `https://<project>.supabase.co`
    pub url: String,
    /// Service-role key, sent as `apikey` and admin bearer
    pub service_key: String,
    /// Project JWT secret; enables local token verification
    pub jwt_secret: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: GoTrueMetadata,
}

impl From<GoTrueUser> for Identity {
    fn from(user: GoTrueUser) -> Self {
        Identity {
            id: user.id,
            email: user.email,
            name: user.user_metadata.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    user: GoTrueUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Error payloads differ between GoTrue endpoints and versions
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<GoTrueErrorBody>(body)
        .ok()
        .and_then(GoTrueErrorBody::into_message)
        .unwrap_or_else(|| format!("identity provider returned {}", status))
}

/// HTTP client for a GoTrue-compatible provider
#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    service_key: String,
    verifier: Option<TokenService>,
}

impl GoTrueClient {
    pub fn new(config: GoTrueConfig) -> IdentityResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| IdentityError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        // access tokens are verified only; expiry is irrelevant here
        let verifier = config
            .jwt_secret
            .map(|secret| TokenService::new(TokenConfig::new(secret, 0)));

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
            verifier,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> IdentityResult<Response> {
        request
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider request failed: {}", e);
                IdentityError::Unavailable(e.to_string())
            })
    }

    /// Map a non-success response to an error; 4xx are rejections
    async fn reject(response: Response) -> IdentityError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        if status.is_client_error() {
            warn!(%status, %message, "identity provider rejected request");
            IdentityError::Rejected(message)
        } else {
            error!(%status, %message, "identity provider failed");
            IdentityError::Unavailable(message)
        }
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> IdentityResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Unexpected provider response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn authenticate(&self, token: &str) -> IdentityResult<Identity> {
        if let Some(verifier) = &self.verifier {
            return verifier.validate(token).map(Identity::from);
        }

        let response = self
            .send(self.http.get(self.endpoint("user")).bearer_auth(token))
            .await?;
        match response.status() {
            status if status.is_success() => {
                let user: GoTrueUser = Self::parse(response).await?;
                debug!(user_id = %user.id, "token resolved by provider");
                Ok(user.into())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::InvalidToken),
            _ => Err(Self::reject(response).await),
        }
    }

    async fn create_user(&self, account: &NewAccount) -> IdentityResult<Identity> {
        let body = json!({
            "email": account.email,
            "password": account.password,
            "email_confirm": true,
            "user_metadata": { "name": account.name, "role": account.role },
        });
        let response = self
            .send(
                self.http
                    .post(self.endpoint("admin/users"))
                    .bearer_auth(&self.service_key)
                    .json(&body),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let user: GoTrueUser = Self::parse(response).await?;
        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let response = self
            .send(
                self.http
                    .post(self.endpoint("token"))
                    .query(&[("grant_type", "password")])
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let session: GoTrueSession = Self::parse(response).await?;
        Ok(Session {
            access_token: session.access_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            refresh_token: session.refresh_token,
            user: session.user.into(),
        })
    }

    fn name(&self) -> &'static str {
        "gotrue"
    }
}
