//! Axum HTTP API server.
//!
//! This crate provides:
//! - Manual bundle regeneration and snapshot retrieval
//! - Upload/delete notification webhooks
//! - Health and readiness probes
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, StorageBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
