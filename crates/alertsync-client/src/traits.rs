//! Client traits for the remote alerting API.
//!
//! The HTTP transport and authentication are provided by the embedding
//! application. It implements these traits; everything in AlertSync talks to
//! the service only through them.

use std::sync::Arc;

use alertsync_core::Page;
use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{IssueAlert, MetricAlert, Project};

/// Project listing.
#[async_trait]
pub trait ProjectsClient: Send + Sync {
    /// Lists one page of projects in an organization.
    ///
    /// `cursor` is `None` for the first page.
    async fn list_projects(
        &self,
        organization: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<Project>>;
}

/// CRUD calls for issue alert rules.
///
/// A missing rule is reported as a `ClientError::Api` with status 404.
#[async_trait]
pub trait IssueAlertsClient: Send + Sync {
    /// Lists one page of issue alerts in a project.
    async fn list_issue_alerts(
        &self,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<IssueAlert>>;

    /// Fetches one issue alert.
    async fn get_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<IssueAlert>;

    /// Creates an issue alert; the response carries the server-assigned id.
    async fn create_issue_alert(
        &self,
        organization: &str,
        project: &str,
        alert: &IssueAlert,
    ) -> ClientResult<IssueAlert>;

    /// Replaces an existing issue alert.
    async fn update_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
        alert: &IssueAlert,
    ) -> ClientResult<IssueAlert>;

    /// Deletes an issue alert.
    async fn delete_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()>;
}

/// CRUD calls for metric alert rules.
///
/// A missing rule is reported as a `ClientError::Api` with status 404.
#[async_trait]
pub trait MetricAlertsClient: Send + Sync {
    /// Lists one page of metric alerts in a project.
    async fn list_metric_alerts(
        &self,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<MetricAlert>>;

    /// Fetches one metric alert.
    async fn get_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<MetricAlert>;

    /// Creates a metric alert. Triggers and trigger actions in the response
    /// carry their server-assigned ids.
    async fn create_metric_alert(
        &self,
        organization: &str,
        project: &str,
        alert: &MetricAlert,
    ) -> ClientResult<MetricAlert>;

    /// Replaces an existing metric alert. Triggers sent with an id are
    /// updated in place; triggers without one are created.
    async fn update_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
        alert: &MetricAlert,
    ) -> ClientResult<MetricAlert>;

    /// Deletes a metric alert.
    async fn delete_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()>;
}

/// The full client surface used by the reconciler.
pub trait AlertsClient: ProjectsClient + IssueAlertsClient + MetricAlertsClient {}

impl<T> AlertsClient for T where T: ProjectsClient + IssueAlertsClient + MetricAlertsClient {}

/// Shareable client handle.
pub type DynClient = Arc<dyn AlertsClient>;
