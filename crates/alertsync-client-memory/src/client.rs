//! In-memory implementation of the alerts client traits.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use alertsync_client::{
    ClientError, ClientResult, IssueAlert, IssueAlertsClient, MetricAlert, MetricAlertsClient,
    Project, ProjectsClient,
};
use alertsync_core::Page;
use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::debug;

use crate::normalize;

/// Default number of items per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// An alerts client backed by in-process maps.
///
/// Behaves like the remote service where the reconciler can observe it:
/// ids are assigned on create, server defaults are filled in, missing rules
/// answer with status 404 and listings are paginated with opaque cursors.
#[derive(Debug)]
pub struct InMemoryClient {
    projects: DashMap<String, Vec<Project>>,
    issue_alerts: DashMap<String, BTreeMap<u64, IssueAlert>>,
    metric_alerts: DashMap<String, BTreeMap<u64, MetricAlert>>,
    next_id: AtomicU64,
    page_size: usize,
    reverse_trigger_actions: bool,
    pending_failure: Mutex<Option<ClientError>>,
    calls: Mutex<Vec<String>>,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClient {
    /// Creates an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: DashMap::new(),
            issue_alerts: DashMap::new(),
            metric_alerts: DashMap::new(),
            next_id: AtomicU64::new(1),
            page_size: DEFAULT_PAGE_SIZE,
            reverse_trigger_actions: false,
            pending_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Makes the server return trigger actions in reverse order, the way the
    /// real service sometimes does since it stores them as a set.
    #[must_use]
    pub fn with_reversed_trigger_actions(mut self) -> Self {
        self.reverse_trigger_actions = true;
        self
    }

    /// Registers a project in an organization.
    pub fn add_project(&self, organization: &str, id: &str, slug: &str) {
        self.projects
            .entry(organization.to_string())
            .or_default()
            .push(Project::new(id, slug));
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        if let Ok(mut pending) = self.pending_failure.lock() {
            *pending = Some(error);
        }
    }

    /// Names of the calls received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Removes a metric alert behind the reconciler's back.
    pub fn remove_metric_alert(&self, organization: &str, project: &str, id: &str) -> bool {
        let Ok(id) = id.parse::<u64>() else {
            return false;
        };
        self.metric_alerts
            .get_mut(&scope_key(organization, project))
            .is_some_and(|mut alerts| alerts.remove(&id).is_some())
    }

    /// Removes an issue alert behind the reconciler's back.
    pub fn remove_issue_alert(&self, organization: &str, project: &str, id: &str) -> bool {
        let Ok(id) = id.parse::<u64>() else {
            return false;
        };
        self.issue_alerts
            .get_mut(&scope_key(organization, project))
            .is_some_and(|mut alerts| alerts.remove(&id).is_some())
    }

    /// Stores `alert` verbatim, skipping id assignment and server defaults.
    ///
    /// Lets tests reproduce malformed listings such as an entry without id.
    pub fn insert_raw_issue_alert(&self, organization: &str, project: &str, alert: IssueAlert) {
        let key = self.allocate_id();
        self.issue_alerts
            .entry(scope_key(organization, project))
            .or_default()
            .insert(key, alert);
    }

    fn begin(&self, call: &str) -> ClientResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
        let failure = self.pending_failure.lock().ok().and_then(|mut p| p.take());
        match failure {
            Some(error) => {
                debug!(call, error = %error, "Injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn paginate<T: Clone>(&self, items: &[T], cursor: Option<&str>) -> ClientResult<Page<T>> {
        let offset = match cursor {
            None => 0,
            Some(cursor) => parse_cursor(cursor)?,
        };
        let end = (offset + self.page_size).min(items.len());
        let page = items.get(offset..end).unwrap_or_default().to_vec();
        if end < items.len() {
            Ok(Page::with_next(page, format!("0:{end}:0")))
        } else {
            Ok(Page::last(page))
        }
    }
}

fn scope_key(organization: &str, project: &str) -> String {
    format!("{organization}/{project}")
}

fn parse_cursor(cursor: &str) -> ClientResult<usize> {
    cursor
        .split(':')
        .nth(1)
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| ClientError::api(400, format!("invalid cursor '{cursor}'")))
}

fn parse_id(kind: &str, id: &str) -> ClientResult<u64> {
    id.parse()
        .map_err(|_| ClientError::not_found(format!("{kind} {id}")))
}

fn require_name(name: Option<&str>) -> ClientResult<()> {
    match name {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(ClientError::api(400, "name: This field is required.")),
    }
}

#[async_trait]
impl ProjectsClient for InMemoryClient {
    async fn list_projects(
        &self,
        organization: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<Project>> {
        self.begin("list_projects")?;
        let projects = self
            .projects
            .get(organization)
            .map(|p| p.clone())
            .unwrap_or_default();
        self.paginate(&projects, cursor.as_deref())
    }
}

#[async_trait]
impl IssueAlertsClient for InMemoryClient {
    async fn list_issue_alerts(
        &self,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<IssueAlert>> {
        self.begin("list_issue_alerts")?;
        let alerts: Vec<IssueAlert> = self
            .issue_alerts
            .get(&scope_key(organization, project))
            .map(|a| a.values().cloned().collect())
            .unwrap_or_default();
        self.paginate(&alerts, cursor.as_deref())
    }

    async fn get_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<IssueAlert> {
        self.begin("get_issue_alert")?;
        let key = parse_id("issue alert", id)?;
        self.issue_alerts
            .get(&scope_key(organization, project))
            .and_then(|alerts| alerts.get(&key).cloned())
            .ok_or_else(|| ClientError::not_found(format!("issue alert {id}")))
    }

    async fn create_issue_alert(
        &self,
        organization: &str,
        project: &str,
        alert: &IssueAlert,
    ) -> ClientResult<IssueAlert> {
        self.begin("create_issue_alert")?;
        require_name(alert.name.as_deref())?;

        let id = self.allocate_id();
        let mut stored = alert.clone();
        stored.id = Some(id.to_string());
        stored.date_created = Some(OffsetDateTime::now_utc());
        normalize::issue_alert(&mut stored, project, &mut || self.allocate_id());

        self.issue_alerts
            .entry(scope_key(organization, project))
            .or_default()
            .insert(id, stored.clone());
        debug!(organization, project, id, "Stored issue alert");
        Ok(stored)
    }

    async fn update_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
        alert: &IssueAlert,
    ) -> ClientResult<IssueAlert> {
        self.begin("update_issue_alert")?;
        require_name(alert.name.as_deref())?;
        let key = parse_id("issue alert", id)?;

        let mut alerts = self
            .issue_alerts
            .get_mut(&scope_key(organization, project))
            .ok_or_else(|| ClientError::not_found(format!("issue alert {id}")))?;
        let current = alerts
            .get(&key)
            .ok_or_else(|| ClientError::not_found(format!("issue alert {id}")))?;

        let mut stored = alert.clone();
        stored.id = Some(id.to_string());
        stored.date_created = current.date_created;
        normalize::issue_alert(&mut stored, project, &mut || self.allocate_id());
        alerts.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_issue_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()> {
        self.begin("delete_issue_alert")?;
        let key = parse_id("issue alert", id)?;
        self.issue_alerts
            .get_mut(&scope_key(organization, project))
            .and_then(|mut alerts| alerts.remove(&key))
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("issue alert {id}")))
    }
}

#[async_trait]
impl MetricAlertsClient for InMemoryClient {
    async fn list_metric_alerts(
        &self,
        organization: &str,
        project: &str,
        cursor: Option<String>,
    ) -> ClientResult<Page<MetricAlert>> {
        self.begin("list_metric_alerts")?;
        let alerts: Vec<MetricAlert> = self
            .metric_alerts
            .get(&scope_key(organization, project))
            .map(|a| a.values().cloned().collect())
            .unwrap_or_default();
        self.paginate(&alerts, cursor.as_deref())
    }

    async fn get_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<MetricAlert> {
        self.begin("get_metric_alert")?;
        let key = parse_id("metric alert", id)?;
        self.metric_alerts
            .get(&scope_key(organization, project))
            .and_then(|alerts| alerts.get(&key).cloned())
            .ok_or_else(|| ClientError::not_found(format!("metric alert {id}")))
    }

    async fn create_metric_alert(
        &self,
        organization: &str,
        project: &str,
        alert: &MetricAlert,
    ) -> ClientResult<MetricAlert> {
        self.begin("create_metric_alert")?;
        require_name(alert.name.as_deref())?;

        let id = self.allocate_id();
        let mut stored = alert.clone();
        stored.id = Some(id.to_string());
        stored.date_created = Some(OffsetDateTime::now_utc());
        normalize::metric_alert(
            &mut stored,
            &id.to_string(),
            project,
            &[],
            self.reverse_trigger_actions,
            &mut || self.allocate_id(),
        );

        self.metric_alerts
            .entry(scope_key(organization, project))
            .or_default()
            .insert(id, stored.clone());
        debug!(organization, project, id, "Stored metric alert");
        Ok(stored)
    }

    async fn update_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
        alert: &MetricAlert,
    ) -> ClientResult<MetricAlert> {
        self.begin("update_metric_alert")?;
        require_name(alert.name.as_deref())?;
        let key = parse_id("metric alert", id)?;

        let mut alerts = self
            .metric_alerts
            .get_mut(&scope_key(organization, project))
            .ok_or_else(|| ClientError::not_found(format!("metric alert {id}")))?;
        let current = alerts
            .get(&key)
            .ok_or_else(|| ClientError::not_found(format!("metric alert {id}")))?;

        let mut stored = alert.clone();
        stored.id = Some(id.to_string());
        stored.date_created = current.date_created;
        normalize::metric_alert(
            &mut stored,
            id,
            project,
            &current.triggers,
            self.reverse_trigger_actions,
            &mut || self.allocate_id(),
        );
        alerts.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_metric_alert(
        &self,
        organization: &str,
        project: &str,
        id: &str,
    ) -> ClientResult<()> {
        self.begin("delete_metric_alert")?;
        let key = parse_id("metric alert", id)?;
        self.metric_alerts
            .get_mut(&scope_key(organization, project))
            .and_then(|mut alerts| alerts.remove(&key))
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("metric alert {id}")))
    }
}
