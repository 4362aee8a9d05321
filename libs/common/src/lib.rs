//! Common library for the tutoring service
//!
//! This crate provides the key-value storage layer shared by the services:
//! the [`store::KvStore`] trait, an in-memory backend, and Redis and
//! Postgres backends.

pub mod cache;
pub mod database;
pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{KvEntry, KvStore, MemoryStore};
