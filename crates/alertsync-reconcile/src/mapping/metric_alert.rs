use alertsync_client::{MetricAlert, MetricAlertTrigger};
use alertsync_core::CompositeId;

use super::trigger_action::{trigger_action_from_object, trigger_action_to_object};
use super::{MappingError, non_empty, required};
use crate::model::{MetricAlertRule, Trigger};

const KIND: &str = "metric alert";
const TRIGGER: &str = "metric alert trigger";

/// Builds the create/update payload for a metric alert.
///
/// Trigger and trigger action ids present in the declaration are sent back so
/// the service updates those objects in place.
pub fn metric_alert_to_payload(rule: &MetricAlertRule) -> Result<MetricAlert, MappingError> {
    let name = required(KIND, "name", &rule.name)?;
    let aggregate = required(KIND, "aggregate", &rule.aggregate)?;
    if rule.projects.is_empty() {
        return Err(MappingError::missing(KIND, "projects"));
    }

    let triggers = rule
        .triggers
        .iter()
        .map(trigger_to_payload)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MetricAlert {
        name: Some(name.to_string()),
        environment: non_empty(rule.environment.as_ref()),
        data_set: non_empty(rule.dataset.as_ref()),
        query: Some(rule.query.clone()),
        aggregate: Some(aggregate.to_string()),
        time_window: Some(rule.time_window),
        threshold_type: Some(rule.threshold_type),
        resolve_threshold: rule.resolve_threshold,
        triggers,
        projects: rule.projects.clone(),
        owner: non_empty(rule.owner.as_ref()),
        ..Default::default()
    })
}

fn trigger_to_payload(trigger: &Trigger) -> Result<MetricAlertTrigger, MappingError> {
    let label = required(TRIGGER, "label", &trigger.label)?;
    Ok(MetricAlertTrigger {
        id: non_empty(trigger.id.as_ref()),
        alert_rule_id: non_empty(trigger.alert_rule_id.as_ref()),
        label: Some(label.to_string()),
        threshold_type: Some(trigger.threshold_type),
        alert_threshold: Some(trigger.alert_threshold),
        resolve_threshold: trigger.resolve_threshold,
        actions: trigger.actions.iter().map(trigger_action_to_object).collect(),
    })
}

/// Rebuilds the declared shape from a server response.
///
/// Scalars the response omits read back as zero values; the only hard
/// failure is a trigger action without a recognised `type`.
pub fn metric_alert_from_payload(
    id: &CompositeId,
    payload: MetricAlert,
) -> Result<MetricAlertRule, MappingError> {
    let triggers = payload
        .triggers
        .into_iter()
        .map(trigger_from_payload)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MetricAlertRule {
        organization: id.organization().to_string(),
        projects: payload.projects,
        name: payload.name.unwrap_or_default(),
        environment: non_empty(payload.environment.as_ref()),
        dataset: non_empty(payload.data_set.as_ref()),
        query: payload.query.unwrap_or_default(),
        aggregate: payload.aggregate.unwrap_or_default(),
        time_window: payload.time_window.unwrap_or_default(),
        threshold_type: payload.threshold_type.unwrap_or_default(),
        resolve_threshold: payload.resolve_threshold,
        owner: non_empty(payload.owner.as_ref()),
        triggers,
        internal_id: payload.id,
    })
}

fn trigger_from_payload(trigger: MetricAlertTrigger) -> Result<Trigger, MappingError> {
    let actions = trigger
        .actions
        .iter()
        .map(trigger_action_from_object)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Trigger {
        id: trigger.id,
        alert_rule_id: trigger.alert_rule_id,
        label: trigger.label.unwrap_or_default(),
        threshold_type: trigger.threshold_type.unwrap_or_default(),
        alert_threshold: trigger.alert_threshold.unwrap_or_default(),
        resolve_threshold: trigger.resolve_threshold,
        actions,
    })
}
