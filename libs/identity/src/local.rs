//! In-process identity provider
//!
//! Keeps accounts in memory with Argon2 password hashes and mints HS256
//! tokens through [`TokenService`]. Meant for local development and tests;
//! accounts do not survive a restart.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use async_trait::async_trait;
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    Identity, IdentityError, IdentityProvider, IdentityResult, NewAccount, Session,
    jwt::TokenService,
};

struct Account {
    identity: Identity,
    password_hash: String,
}

/// Identity provider living inside the API process
pub struct LocalIdentity {
    tokens: TokenService,
    /// Accounts keyed by lowercased email
    accounts: RwLock<HashMap<String, Account>>,
}

impl LocalIdentity {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a token for an identity that was provisioned outside the API
    pub fn issue_token(&self, identity: &Identity) -> IdentityResult<String> {
        self.tokens.issue(identity)
    }

    fn hash_password(password: &str) -> IdentityResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(password: &str, hash: &str) -> IdentityResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| IdentityError::Internal(format!("Failed to parse password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn authenticate(&self, token: &str) -> IdentityResult<Identity> {
        // any validly signed token is accepted, including ones minted for
        // externally provisioned users that have no local account
        self.tokens.validate(token).map(Identity::from)
    }

    async fn create_user(&self, account: &NewAccount) -> IdentityResult<Identity> {
        let email = account.email.trim().to_lowercase();
        let duplicate = || {
            warn!(email = %email, "email already registered");
            IdentityError::Rejected(
                "A user with this email address has already been registered".to_string(),
            )
        };
        if self.accounts.read().await.contains_key(&email) {
            return Err(duplicate());
        }

        // hashing is slow, keep it outside the write lock
        let password_hash = Self::hash_password(&account.password)?;
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: Some(email.clone()),
            name: Some(account.name.clone()),
        };

        match self.accounts.write().await.entry(email.clone()) {
            Entry::Occupied(_) => return Err(duplicate()),
            Entry::Vacant(slot) => {
                slot.insert(Account {
                    identity: identity.clone(),
                    password_hash,
                });
            }
        }

        info!(user_id = %identity.id, role = %account.role, "local account created");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let email = email.trim().to_lowercase();
        let invalid = || IdentityError::Rejected("Invalid login credentials".to_string());

        let (identity, password_hash) = {
            let accounts = self.accounts.read().await;
            let account = accounts.get(&email).ok_or_else(invalid)?;
            (account.identity.clone(), account.password_hash.clone())
        };
        if !Self::verify_password(password, &password_hash)? {
            warn!(user_id = %identity.id, "invalid password");
            return Err(invalid());
        }

        Ok(Session {
            access_token: self.tokens.issue(&identity)?,
            token_type: "bearer".to_string(),
            expires_in: self.tokens.access_token_expiry(),
            refresh_token: None,
            user: identity,
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
