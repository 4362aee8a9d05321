//! Application state shared across handlers

use anyhow::{Context, Result, bail};
use common::{
    KvStore, MemoryStore,
    cache::{RedisConfig, RedisStore},
    database::{DatabaseConfig, PgStore},
};
use identity::{
    GoTrueClient, GoTrueConfig, IdentityProvider, LocalIdentity, TokenConfig, TokenService,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::{IdentityBackend, IdentitySettings, StoreBackend, StoreSettings},
    repositories::{BalanceLogRepository, LessonRepository, ProfileRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: ProfileRepository,
    pub lessons: LessonRepository,
    pub balance_log: BalanceLogRepository,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            lessons: LessonRepository::new(store.clone()),
            balance_log: BalanceLogRepository::new(store.clone()),
            store,
            identity,
        }
    }
}

/// Connect the configured key-value backend
pub async fn connect_store(settings: &StoreSettings) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match settings.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            let config = RedisConfig {
                url: settings.redis_url.clone(),
            };
            Arc::new(RedisStore::new(&config).context("Failed to create Redis store")?)
        }
        StoreBackend::Postgres => {
            let config = DatabaseConfig {
                database_url: settings.database_url.clone(),
                max_connections: settings.max_connections,
            };
            Arc::new(
                PgStore::connect(&config)
                    .await
                    .context("Failed to connect to Postgres store")?,
            )
        }
    };

    if store.health_check().await? {
        info!(backend = store.backend(), "Store connection successful");
    } else {
        bail!("Store backend {} is not reachable", store.backend());
    }

    Ok(store)
}

/// Build the configured identity provider
pub fn build_identity(settings: &IdentitySettings) -> Result<Arc<dyn IdentityProvider>> {
    let provider: Arc<dyn IdentityProvider> = match settings.provider {
        IdentityBackend::Local => {
            if settings.jwt_secret.is_none() {
                warn!("TUTOR_IDENTITY__JWT_SECRET not set; using the development secret");
            }
            let tokens = TokenService::new(TokenConfig::new(
                settings.local_secret(),
                settings.token_ttl_seconds,
            ));
            Arc::new(LocalIdentity::new(tokens))
        }
        IdentityBackend::GoTrue => {
            let url = settings
                .url
                .clone()
                .context("TUTOR_IDENTITY__URL is required for the gotrue provider")?;
            let service_key = settings
                .service_key
                .clone()
                .context("TUTOR_IDENTITY__SERVICE_KEY is required for the gotrue provider")?;
            Arc::new(GoTrueClient::new(GoTrueConfig {
                url,
                service_key,
                jwt_secret: settings.jwt_secret.clone(),
                timeout_seconds: settings.timeout_seconds,
            })?)
        }
    };

    info!(provider = provider.name(), "Identity provider configured");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_connects() {
        let store = connect_store(&StoreSettings::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[test]
    fn test_gotrue_requires_url_and_key() {
        let settings = IdentitySettings {
            provider: IdentityBackend::GoTrue,
            ..IdentitySettings::default()
        };
        assert!(build_identity(&settings).is_err());

        let settings = IdentitySettings {
            provider: IdentityBackend::GoTrue,
            url: Some("https://project.supabase.co".to_string()),
            service_key: Some("service-key".to_string()),
            ..IdentitySettings::default()
        };
        assert_eq!(build_identity(&settings).unwrap().name(), "gotrue");
    }

    #[test]
    fn test_local_is_default() {
        let provider = build_identity(&IdentitySettings::default()).unwrap();
        assert_eq!(provider.name(), "local");
    }
}
