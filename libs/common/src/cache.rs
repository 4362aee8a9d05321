//! Redis key-value backend
//!
//! This module provides a Redis-backed [`KvStore`]. Values are stored as
//! JSON strings; prefix scans walk the key space with `SCAN MATCH` and fetch
//! the matching values with `MGET`.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::{KvEntry, KvStore};

/// Number of keys requested per SCAN round trip
const SCAN_BATCH: usize = 200;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        RedisConfig { url }
    }
}

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Initialize a new Redis client
    pub fn new(config: &RedisConfig) -> StoreResult<Self> {
        let client = Client::open(config.url.clone())
            .map_err(|e| StoreError::Configuration(format!("Invalid Redis URL: {}", e)))?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisStore { client })
    }

    /// Get a connection from the client
    async fn get_connection(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Escape glob metacharacters so a key prefix matches literally in `SCAN MATCH`
pub(crate) fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let raw = serde_json::to_string(&value)?;
        let _: () = conn.set(key, raw).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<KvEntry>> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}*", glob_escape(prefix));

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        debug!(prefix, count = keys.len(), "redis prefix scan");

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut entries = Vec::with_capacity(keys.len());
        for (key, raw) in keys.into_iter().zip(values) {
            // a key deleted between SCAN and MGET comes back as nil
            if let Some(raw) = raw {
                entries.push(KvEntry {
                    key,
                    value: serde_json::from_str(&raw)?,
                });
            }
        }
        Ok(entries)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
