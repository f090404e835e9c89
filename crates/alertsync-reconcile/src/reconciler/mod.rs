//! The create/read/update/delete state machine for alert rules.
//!
//! A [`Reconciler`] owns nothing but a client handle and settings. Local state
//! lives in a [`ResourceState`] the caller persists: the composite identifier
//! plus the last declared or observed rule.

mod kinds;

use std::marker::PhantomData;

use alertsync_client::DynClient;
use alertsync_core::{CompositeId, walk_pages};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::ReconcileSettings;
use crate::drift::Drift;
use crate::error::ReconcileError;
use crate::mapping::MappingError;

pub use kinds::{AlertKind, IssueAlerts, MetricAlerts};

pub type IssueAlertReconciler = Reconciler<IssueAlerts>;
pub type MetricAlertReconciler = Reconciler<MetricAlerts>;

/// Locally persisted state of one managed rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<R> {
    /// Composite identifier; `None` until created or after the rule vanished.
    pub id: Option<String>,
    pub rule: R,
}

impl<R> ResourceState<R> {
    /// State for a rule that does not exist remotely yet.
    pub fn planned(rule: R) -> Self {
        Self { id: None, rule }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

/// Result of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The rule exists and the state now mirrors it.
    Present,
    /// The rule no longer exists; the local identifier was cleared.
    Absent,
}

/// What [`Reconciler::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    Updated(Drift),
    Unchanged,
}

/// Reconciles declared rules of kind `K` against the service.
pub struct Reconciler<K: AlertKind> {
    client: DynClient,
    settings: ReconcileSettings,
    _kind: PhantomData<fn() -> K>,
}

impl<K: AlertKind> Clone for Reconciler<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            settings: self.settings.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: AlertKind> Reconciler<K> {
    pub fn new(client: DynClient) -> Self {
        Self::with_settings(client, ReconcileSettings::default())
    }

    pub fn with_settings(client: DynClient, settings: ReconcileSettings) -> Self {
        Self {
            client,
            settings,
            _kind: PhantomData,
        }
    }

    /// Creates the rule and reads it back.
    ///
    /// On success `state.id` holds the new composite identifier and
    /// `state.rule` the authoritative server shape.
    pub async fn create(&self, state: &mut ResourceState<K::Rule>) -> Result<(), ReconcileError> {
        let (org, project) = K::scope(&state.rule)?;
        let payload = K::to_payload(&state.rule)?;
        if self.settings.log_payloads {
            debug!(kind = K::NAME, org = %org, project = %project, payload = ?payload, "Create payload");
        }

        let created = K::create(&*self.client, &org, &project, &payload)
            .await
            .map_err(ReconcileError::Transport)?;
        let resource_id =
            K::payload_id(&created).ok_or(MappingError::MissingResourceId(K::NAME))?;
        let id = CompositeId::new(org.as_str(), project.as_str(), resource_id)?;

        info!(kind = K::NAME, org = %org, project = %project, alert_id = %id, "Created alert rule");
        state.id = Some(id.to_string());

        match self.read(state).await? {
            ReadOutcome::Present => Ok(()),
            ReadOutcome::Absent => Err(ReconcileError::not_found(K::NAME, id.to_string())),
        }
    }

    /// Refreshes `state.rule` from the service.
    ///
    /// A rule that no longer exists is not an error: the identifier is
    /// cleared and [`ReadOutcome::Absent`] returned.
    pub async fn read(
        &self,
        state: &mut ResourceState<K::Rule>,
    ) -> Result<ReadOutcome, ReconcileError> {
        let Some(raw) = state.id.as_deref() else {
            return Ok(ReadOutcome::Absent);
        };
        let id: CompositeId = raw.parse()?;
        debug!(kind = K::NAME, alert_id = %id, "Reading alert rule");

        match self.fetch(&id).await? {
            Some(rule) => {
                state.rule = rule;
                Ok(ReadOutcome::Present)
            }
            None => {
                info!(kind = K::NAME, alert_id = %id, "Alert rule no longer exists, removing from state");
                state.id = None;
                Ok(ReadOutcome::Absent)
            }
        }
    }

    /// Pushes `state.rule` to the existing rule and reads it back.
    ///
    /// Fails with `NotFound` when the rule does not exist.
    pub async fn update(&self, state: &mut ResourceState<K::Rule>) -> Result<(), ReconcileError> {
        let Some(raw) = state.id.as_deref() else {
            return Err(ReconcileError::not_found(K::NAME, "<no identifier>"));
        };
        let id: CompositeId = raw.parse()?;
        let payload = K::to_payload(&state.rule)?;
        if self.settings.log_payloads {
            debug!(kind = K::NAME, alert_id = %id, payload = ?payload, "Update payload");
        }

        K::update(
            &*self.client,
            id.organization(),
            id.project(),
            id.resource_id(),
            &payload,
        )
        .await
        .map_err(|err| {
            if err.is_not_found() {
                ReconcileError::not_found(K::NAME, id.to_string())
            } else {
                ReconcileError::Transport(err)
            }
        })?;
        info!(kind = K::NAME, alert_id = %id, "Updated alert rule");

        match self.read(state).await? {
            ReadOutcome::Present => Ok(()),
            ReadOutcome::Absent => Err(ReconcileError::not_found(K::NAME, id.to_string())),
        }
    }

    /// Deletes the rule. Deleting a rule that is already gone succeeds.
    pub async fn delete(&self, state: &mut ResourceState<K::Rule>) -> Result<(), ReconcileError> {
        let Some(raw) = state.id.as_deref() else {
            return Ok(());
        };
        let id: CompositeId = raw.parse()?;

        match K::delete(&*self.client, id.organization(), id.project(), id.resource_id()).await {
            Ok(()) => info!(kind = K::NAME, alert_id = %id, "Deleted alert rule"),
            Err(err) if err.is_not_found() => {
                debug!(kind = K::NAME, alert_id = %id, "Alert rule already deleted");
            }
            Err(err) => return Err(ReconcileError::Transport(err)),
        }
        state.id = None;
        Ok(())
    }

    /// Builds the full state of an existing rule from its identifier alone.
    ///
    /// Returns `None` when the rule does not exist.
    pub async fn import(
        &self,
        id: &str,
    ) -> Result<Option<ResourceState<K::Rule>>, ReconcileError> {
        let id: CompositeId = id.parse()?;
        let Some(rule) = self.fetch(&id).await? else {
            return Ok(None);
        };
        info!(kind = K::NAME, alert_id = %id, "Imported alert rule");
        Ok(Some(ResourceState {
            id: Some(id.to_string()),
            rule,
        }))
    }

    /// Converges the service to `state.rule` in one pass.
    ///
    /// `state.id` is the identifier from the previous pass, if any. A rule
    /// that vanished remotely is created again. When nothing drifted the
    /// state takes the observed shape and no mutation is issued.
    pub async fn apply(
        &self,
        state: &mut ResourceState<K::Rule>,
    ) -> Result<ApplyOutcome, ReconcileError> {
        let Some(raw) = state.id.as_deref() else {
            self.create(state).await?;
            return Ok(ApplyOutcome::Created);
        };
        let id: CompositeId = raw.parse()?;

        let Some(observed) = self.fetch(&id).await? else {
            warn!(kind = K::NAME, alert_id = %id, "Alert rule deleted outside of AlertSync, recreating");
            state.id = None;
            self.create(state).await?;
            return Ok(ApplyOutcome::Created);
        };

        K::adopt_server_ids(&mut state.rule, &observed);
        let drift = K::drift(&state.rule, &observed)?;
        if drift.is_empty() {
            debug!(kind = K::NAME, alert_id = %id, "Alert rule up to date");
            state.rule = observed;
            return Ok(ApplyOutcome::Unchanged);
        }

        info!(kind = K::NAME, alert_id = %id, drift = %drift, "Alert rule drifted");
        self.update(state).await?;
        Ok(ApplyOutcome::Updated(drift))
    }

    /// Lists every rule of this kind in a project, keyed by composite id.
    pub async fn list(
        &self,
        organization: &str,
        project: &str,
    ) -> Result<IndexMap<String, K::Rule>, ReconcileError> {
        let client = &*self.client;
        let payloads = walk_pages(
            |cursor| K::list(client, organization, project, cursor),
            |payload| (K::payload_id(&payload).map(str::to_string), payload),
        )
        .await
        .map_err(ReconcileError::Transport)?;

        let mut rules = IndexMap::with_capacity(payloads.len());
        for (resource_id, payload) in payloads {
            let resource_id = resource_id.ok_or(MappingError::MissingResourceId(K::NAME))?;
            let id = CompositeId::new(organization, project, resource_id)?;
            let rule = K::from_payload(&id, payload)?;
            rules.insert(id.to_string(), rule);
        }
        debug!(kind = K::NAME, org = organization, project, count = rules.len(), "Listed alert rules");
        Ok(rules)
    }

    async fn fetch(&self, id: &CompositeId) -> Result<Option<K::Rule>, ReconcileError> {
        match K::get(&*self.client, id.organization(), id.project(), id.resource_id()).await {
            Ok(payload) => Ok(Some(K::from_payload(id, payload)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(ReconcileError::Transport(err)),
        }
    }
}
