//! Per-kind glue between the reconciler, the mapper and the client.

use alertsync_client::{AlertsClient, ClientResult, IssueAlert, MetricAlert, Page};
use alertsync_core::CompositeId;
use async_trait::async_trait;

use crate::drift::{self, Drift};
use crate::mapping::{self, MappingError};
use crate::model::{IssueAlertRule, MetricAlertRule};

/// A kind of alert rule the reconciler can manage.
#[async_trait]
pub trait AlertKind: Send + Sync + 'static {
    /// Declared shape.
    type Rule: Clone + PartialEq + std::fmt::Debug + Send + Sync;
    /// API payload.
    type Payload: std::fmt::Debug + Send + Sync;

    /// Human-readable kind name used in logs and errors.
    const NAME: &'static str;

    /// Organization and project the rule lives in.
    fn scope(rule: &Self::Rule) -> Result<(String, String), MappingError>;

    fn to_payload(rule: &Self::Rule) -> Result<Self::Payload, MappingError>;

    fn from_payload(id: &CompositeId, payload: Self::Payload) -> Result<Self::Rule, MappingError>;

    fn payload_id(payload: &Self::Payload) -> Option<&str>;

    fn drift(declared: &Self::Rule, observed: &Self::Rule) -> Result<Drift, MappingError>;

    /// Copies server-assigned nested ids from `observed` into `declared`.
    fn adopt_server_ids(_declared: &mut Self::Rule, _observed: &Self::Rule) {}

    async fn list(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<Self::Payload>>;

    async fn get(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<Self::Payload>;

    async fn create(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        payload: &Self::Payload,
    ) -> ClientResult<Self::Payload>;

    async fn update(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
        payload: &Self::Payload,
    ) -> ClientResult<Self::Payload>;

    async fn delete(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()>;
}

/// Issue alert rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueAlerts;

/// Metric alert rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricAlerts;

fn scope_segment(kind: &str, attribute: &'static str, value: &str) -> Result<String, MappingError> {
    mapping::required(kind, attribute, value).map(str::to_string)
}

#[async_trait]
impl AlertKind for IssueAlerts {
    type Rule = IssueAlertRule;
    type Payload = IssueAlert;

    const NAME: &'static str = "issue alert";

    fn scope(rule: &IssueAlertRule) -> Result<(String, String), MappingError> {
        Ok((
            scope_segment(Self::NAME, "organization", &rule.organization)?,
            scope_segment(Self::NAME, "project", &rule.project)?,
        ))
    }

    fn to_payload(rule: &IssueAlertRule) -> Result<IssueAlert, MappingError> {
        mapping::issue_alert_to_payload(rule)
    }

    fn from_payload(id: &CompositeId, payload: IssueAlert) -> Result<IssueAlertRule, MappingError> {
        mapping::issue_alert_from_payload(id, payload)
    }

    fn payload_id(payload: &IssueAlert) -> Option<&str> {
        payload.id.as_deref().filter(|id| !id.is_empty())
    }

    fn drift(declared: &IssueAlertRule, observed: &IssueAlertRule) -> Result<Drift, MappingError> {
        drift::issue_alert_drift(declared, observed)
    }

    async fn list(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<IssueAlert>> {
        client.list_issue_alerts(organization, project, cursor).await
    }

    async fn get(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<IssueAlert> {
        client.get_issue_alert(organization, project, id).await
    }

    async fn create(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        payload: &IssueAlert,
    ) -> ClientResult<IssueAlert> {
        client.create_issue_alert(organization, project, payload).await
    }

    async fn update(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
        payload: &IssueAlert,
    ) -> ClientResult<IssueAlert> {
        client.update_issue_alert(organization, project, id, payload).await
    }

    async fn delete(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()> {
        client.delete_issue_alert(organization, project, id).await
    }
}

#[async_trait]
impl AlertKind for MetricAlerts {
    type Rule = MetricAlertRule;
    type Payload = MetricAlert;

    const NAME: &'static str = "metric alert";

    /// The single declared project forms the identifier scope.
    fn scope(rule: &MetricAlertRule) -> Result<(String, String), MappingError> {
        let organization = scope_segment(Self::NAME, "organization", &rule.organization)?;
        let project = rule
            .project()
            .ok_or(MappingError::ProjectScope(rule.projects.len()))?;
        Ok((organization, scope_segment(Self::NAME, "project", project)?))
    }

    fn to_payload(rule: &MetricAlertRule) -> Result<MetricAlert, MappingError> {
        mapping::metric_alert_to_payload(rule)
    }

    fn from_payload(id: &CompositeId, payload: MetricAlert) -> Result<MetricAlertRule, MappingError> {
        mapping::metric_alert_from_payload(id, payload)
    }

    fn payload_id(payload: &MetricAlert) -> Option<&str> {
        payload.id.as_deref().filter(|id| !id.is_empty())
    }

    fn drift(declared: &MetricAlertRule, observed: &MetricAlertRule) -> Result<Drift, MappingError> {
        Ok(drift::metric_alert_drift(declared, observed))
    }

    fn adopt_server_ids(declared: &mut MetricAlertRule, observed: &MetricAlertRule) {
        drift::adopt_metric_alert_ids(declared, observed);
    }

    async fn list(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<MetricAlert>> {
        client.list_metric_alerts(organization, project, cursor).await
    }

    async fn get(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<MetricAlert> {
        client.get_metric_alert(organization, project, id).await
    }

    async fn create(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        payload: &MetricAlert,
    ) -> ClientResult<MetricAlert> {
        client.create_metric_alert(organization, project, payload).await
    }

    async fn update(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
        payload: &MetricAlert,
    ) -> ClientResult<MetricAlert> {
        client.update_metric_alert(organization, project, id, payload).await
    }

    async fn delete(
        client: &dyn AlertsClient,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()> {
        client.delete_metric_alert(organization, project, id).await
    }
}
