//! Upsdeck Client - REST client for the UPS management backend
//!
//! The backend API is a fixed contract (`/ups-management/api/*`); this crate
//! wraps it in typed calls and maps every failure into the three-tier error
//! taxonomy the UI layer surfaces to the user:
//! - `ApiError::Api` — transport succeeded but the payload reports failure
//! - `ApiError::Transport` — the request itself failed
//! - `ApiError::Decode` — the body was not the expected envelope

pub mod api;
pub mod error;

pub use api::{ApiClient, ConnectionTest, Mutation};
pub use error::ApiError;
