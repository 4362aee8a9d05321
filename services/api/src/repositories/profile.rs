//! Profile repository, key `user:{id}`

use common::{
    KvStore, StoreResult,
    store::{get_as, set_as},
};
use std::sync::Arc;

use super::decode_entries;
use crate::models::Profile;

const PREFIX: &str = "user:";

/// Profile repository for store operations
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn KvStore>,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn key(id: &str) -> String {
        format!("{}{}", PREFIX, id)
    }

    /// Find a profile by user id
    pub async fn get(&self, id: &str) -> StoreResult<Option<Profile>> {
        get_as(self.store.as_ref(), &Self::key(id)).await
    }

    /// Insert or overwrite a profile
    pub async fn save(&self, profile: &Profile) -> StoreResult<()> {
        set_as(self.store.as_ref(), &Self::key(&profile.id), profile).await
    }

    /// Every stored profile, ordered by id
    pub async fn list(&self) -> StoreResult<Vec<Profile>> {
        decode_entries(self.store.scan_prefix(PREFIX).await?)
    }

    /// Teachers and admins
    pub async fn list_staff(&self) -> StoreResult<Vec<Profile>> {
        let mut profiles = self.list().await?;
        profiles.retain(|p| p.role.is_staff());
        Ok(profiles)
    }
}
