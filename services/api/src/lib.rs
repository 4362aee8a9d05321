//! Tutoring scheduling API
//!
//! Students, teachers and admins manage lesson bookings, balances and
//! teacher assignments over a key-value store. Authentication is delegated
//! to an external identity provider.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::{config::AppConfig, state::AppState};
