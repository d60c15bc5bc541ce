//! Galaxy REST API client
//!
//! [`Client`] owns transport concerns (OAuth tokens, retries, pagination).
//! The per-entity modules hold the typed wire records and the small API
//! handles reached through `client.entities(kind)`, `client.roles()` and
//! friends.

pub mod auth;
pub mod catalogs;
pub mod client;
pub mod clusters;
pub mod common;
pub mod data_products;
pub mod entity;
pub mod error;
pub mod policies;
pub mod pool;
pub mod roles;
pub mod service_accounts;
pub mod sql_jobs;
pub mod tags;

pub use client::{Client, ClientConfig, RetryConfig};
pub use entity::{EntityApi, EntityKind};
pub use error::ApiError;
