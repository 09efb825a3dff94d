//! Async client for the Sensi thermostat cloud service.
//!
//! Two surfaces share one cookie-carrying HTTP client:
//!
//! - **REST**: [`ApiClient::authorize`] and [`ApiClient::list_thermostats`]
//! - **Realtime**: the SignalR long-polling hub (`negotiate`, `connect`,
//!   `subscribe`, `poll`, `abort`)
//!
//! This crate performs single requests and classifies their outcome. Session
//! bookkeeping, retry policy, and state tracking live in `sensi-core`.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod realtime;
pub mod thermostats;
pub mod transport;

pub use auth::Credentials;
pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
