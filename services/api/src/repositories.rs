//! Repositories over the key-value store
//!
//! Each repository owns one key family and is the only place that knows
//! its layout.

use common::{KvEntry, StoreResult};
use serde::de::DeserializeOwned;
use tracing::warn;

pub mod balance_log;
pub mod lesson;
pub mod profile;

pub use balance_log::BalanceLogRepository;
pub use lesson::LessonRepository;
pub use profile::ProfileRepository;

/// Decode scanned entries, skipping records that do not match the model
///
/// The store is shared with tools that write records by hand; one bad
/// document must not break every listing.
fn decode_entries<T: DeserializeOwned>(entries: Vec<KvEntry>) -> StoreResult<Vec<T>> {
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry.value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %entry.key, "skipping malformed record: {}", e);
                None
            }
        })
        .collect())
}
