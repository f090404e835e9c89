//! # alertsync-client
//!
//! The boundary between AlertSync and the remote alerting API.
//!
//! This crate defines what a transport must provide, not how it talks HTTP:
//!
//! - [`ProjectsClient`], [`IssueAlertsClient`], [`MetricAlertsClient`]:
//!   typed list/get/create/update/delete calls with cursor pagination
//! - [`IssueAlert`], [`MetricAlert`], [`MetricAlertTrigger`]: API payloads
//! - [`ClientError`]: transport failures, with status 404 as the
//!   "does not exist" sentinel
//!
//! ## Implementing a transport
//!
//! ```ignore
//! use async_trait::async_trait;
//! use alertsync_client::{ClientResult, IssueAlert, IssueAlertsClient};
//!
//! struct HttpClient { /* ... */ }
//!
//! #[async_trait]
//! impl IssueAlertsClient for HttpClient {
//!     async fn get_issue_alert(&self, org: &str, project: &str, id: &str) -> ClientResult<IssueAlert> {
//!         // GET /api/0/projects/{org}/{project}/rules/{id}/
//!     }
//!     // ... other methods
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ClientError, ClientResult, STATUS_NOT_FOUND};
pub use traits::{AlertsClient, DynClient, IssueAlertsClient, MetricAlertsClient, ProjectsClient};
pub use types::{ApiObject, IssueAlert, MetricAlert, MetricAlertTrigger, Project};

pub use alertsync_core::Page;
