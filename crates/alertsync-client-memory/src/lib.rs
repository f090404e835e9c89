//! In-memory alerts client for AlertSync.
//!
//! This crate implements the client traits from `alertsync-client` on top of
//! `dashmap` maps. It reproduces the parts of the remote service the
//! reconciler depends on (id assignment, server defaults, 404 for missing
//! rules, cursor pagination) and adds fault injection for tests.
//!
//! # Example
//!
//! ```ignore
//! use alertsync_client_memory::InMemoryClient;
//! use alertsync_client::IssueAlertsClient;
//!
//! let client = InMemoryClient::new();
//! let created = client.create_issue_alert("acme", "web", &payload).await?;
//! ```

mod client;
pub mod normalize;

pub use client::{DEFAULT_PAGE_SIZE, InMemoryClient};

use alertsync_client::DynClient;

/// Creates a new shareable in-memory client.
pub fn create_client() -> DynClient {
    std::sync::Arc::new(InMemoryClient::new())
}
