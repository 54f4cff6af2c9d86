//! W&B GraphQL proxy support.
//!
//! This module handles:
//! - GraphQL documents and request payloads
//! - The upstream HTTP client
//! - Reshaping run payloads for clients

pub mod client;
pub mod query;
pub mod shaping;
pub mod types;

pub use client::WandbClient;
pub use shaping::{decode_summary_metrics, shape_run_detail, shape_runs};
pub use types::{RunDetailResponse, RunSummary, RunsResponse};
