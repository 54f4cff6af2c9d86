//! Lightweight backend that proxies the W&B GraphQL API.
//!
//! Clients call plain REST routes; the server attaches its own API key,
//! forwards a single GraphQL request, and reshapes the answer. The key never
//! leaves the server.
//!
//! # Modules
//!
//! - [`config`]: Startup configuration and request-time secrets
//! - [`error`]: Error type and its HTTP mapping
//! - [`wandb`]: GraphQL client and response shaping
//! - [`diagnostics`]: Database and environment diagnostics
//! - [`api`]: HTTP routes
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod utils;
pub mod wandb;

pub use config::Config;
pub use error::{ApiError, Result};
