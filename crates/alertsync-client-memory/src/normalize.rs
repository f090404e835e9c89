//! Server-side defaulting applied to stored rules.
//!
//! The remote service does not store payloads verbatim: it fills defaults,
//! renders component names and assigns ids to nested objects. These helpers
//! reproduce that so readback tests see realistic shapes.

use alertsync_client::{ApiObject, IssueAlert, MetricAlert, MetricAlertTrigger};
use serde_json::Value;

/// Default notification frequency in minutes.
pub const DEFAULT_FREQUENCY: i64 = 30;

/// Dataset used when a metric alert does not name one.
pub const DEFAULT_DATASET: &str = "events";

/// Fills server defaults on an issue alert.
pub fn issue_alert(alert: &mut IssueAlert, project: &str, next_id: &mut impl FnMut() -> u64) {
    alert.frequency.get_or_insert(DEFAULT_FREQUENCY);
    alert.projects = vec![project.to_string()];

    for component in alert
        .conditions
        .iter_mut()
        .chain(alert.filters.iter_mut())
        .chain(alert.actions.iter_mut())
    {
        render_name(component);
    }

    // Actions get a per-action uuid the declared shape knows nothing about
    for action in &mut alert.actions {
        action
            .entry("uuid")
            .or_insert_with(|| Value::String(format!("00000000-0000-0000-0000-{:012}", next_id())));
    }
}

/// Fills server defaults on a metric alert and assigns nested ids.
///
/// `existing` holds the triggers currently stored for this alert, so ids sent
/// back by the caller are honoured and unknown ones replaced.
pub fn metric_alert(
    alert: &mut MetricAlert,
    alert_id: &str,
    project: &str,
    existing: &[MetricAlertTrigger],
    reverse_actions: bool,
    next_id: &mut impl FnMut() -> u64,
) {
    if alert.data_set.is_none() {
        alert.data_set = Some(DEFAULT_DATASET.to_string());
    }
    if alert.projects.is_empty() {
        alert.projects = vec![project.to_string()];
    }

    let resolve_threshold = alert.resolve_threshold;
    for trigger in &mut alert.triggers {
        let known = trigger
            .id
            .as_deref()
            .is_some_and(|id| existing.iter().any(|t| t.id.as_deref() == Some(id)));
        if !known {
            trigger.id = Some(next_id().to_string());
        }
        trigger.alert_rule_id = Some(alert_id.to_string());
        if trigger.resolve_threshold.is_none() {
            trigger.resolve_threshold = resolve_threshold;
        }

        let trigger_id = trigger.id.clone().unwrap_or_default();
        for action in &mut trigger.actions {
            trigger_action(action, &trigger_id, &mut *next_id);
        }
        if reverse_actions {
            trigger.actions.reverse();
        }
    }
}

fn trigger_action(action: &mut ApiObject, trigger_id: &str, next_id: &mut impl FnMut() -> u64) {
    let has_id = action
        .get("id")
        .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
    if !has_id {
        action.insert("id".into(), Value::String(next_id().to_string()));
    }
    action.insert("alertRuleTriggerId".into(), Value::String(trigger_id.to_string()));
    action
        .entry("dateCreated")
        .or_insert_with(|| Value::String("2024-01-01T00:00:00Z".to_string()));
}

fn render_name(component: &mut ApiObject) {
    if component.get("name").and_then(Value::as_str).is_some_and(|n| !n.is_empty()) {
        return;
    }
    let rendered = component
        .get("id")
        .and_then(Value::as_str)
        .and_then(|kind| kind.rsplit('.').next())
        .unwrap_or("Unknown")
        .to_string();
    component.insert("name".into(), Value::String(rendered));
}
