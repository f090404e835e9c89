//! Declared vs observed comparison.
//!
//! A field the declaration leaves unset is whatever the service defaults it
//! to, so it never counts as drift. Computed fields (`projects` of issue
//! alerts, internal ids) are ignored. Conditions, filters, actions and
//! triggers compare position by position; actions within a trigger compare
//! as a multiset because the service does not keep their order.

use std::fmt;

use alertsync_client::ApiObject;

use crate::mapping::{
    ComponentKind, MappingError, component_to_object, observed_component_to_object,
    values_equivalent,
};
use crate::model::{Component, IssueAlertRule, MetricAlertRule, Trigger, TriggerAction};

/// Paths of the fields that differ, in comparison order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drift {
    fields: Vec<String>,
}

impl Drift {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.iter().any(|f| f == path)
    }

    fn record(&mut self, path: impl Into<String>) {
        self.fields.push(path.into());
    }

    /// Records `path` when a declared value is set and differs.
    fn optional<T: PartialEq + ?Sized>(
        &mut self,
        path: &str,
        declared: Option<&T>,
        observed: Option<&T>,
    ) {
        if declared.is_some() && declared != observed {
            self.record(path);
        }
    }

    fn required<T: PartialEq + ?Sized>(&mut self, path: &str, declared: &T, observed: &T) {
        if declared != observed {
            self.record(path);
        }
    }
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(", "))
    }
}

/// Compares a declared issue alert against the observed one.
///
/// An observed component missing a declared attribute is drift.
///
/// # Errors
///
/// Fails if a declared component cannot be encoded.
pub fn issue_alert_drift(
    declared: &IssueAlertRule,
    observed: &IssueAlertRule,
) -> Result<Drift, MappingError> {
    let mut drift = Drift::default();
    drift.required("name", &declared.name, &observed.name);
    drift.optional("action_match", declared.action_match.as_ref(), observed.action_match.as_ref());
    drift.optional("filter_match", declared.filter_match.as_ref(), observed.filter_match.as_ref());
    drift.optional("frequency", declared.frequency.as_ref(), observed.frequency.as_ref());
    drift.optional("environment", declared.environment.as_deref(), observed.environment.as_deref());
    drift.optional("owner", declared.owner.as_deref(), observed.owner.as_deref());

    compare_components(&mut drift, "conditions", &declared.conditions, &observed.conditions)?;
    compare_components(&mut drift, "filters", &declared.filters, &observed.filters)?;
    compare_components(&mut drift, "actions", &declared.actions, &observed.actions)?;
    Ok(drift)
}

fn compare_components<K: ComponentKind>(
    drift: &mut Drift,
    path: &str,
    declared: &[Component<K>],
    observed: &[Component<K>],
) -> Result<(), MappingError> {
    if declared.len() != observed.len() {
        drift.record(path);
        return Ok(());
    }
    for (index, (declared, observed)) in declared.iter().zip(observed).enumerate() {
        let declared = component_to_object(declared)?;
        let observed = observed_component_to_object(observed);
        if !object_covers(&declared, &observed) {
            drift.record(format!("{path}[{index}]"));
        }
    }
    Ok(())
}

/// True when every attribute set in `declared` has an equivalent value in
/// `observed`. Extra observed attributes are server-side additions.
fn object_covers(declared: &ApiObject, observed: &ApiObject) -> bool {
    declared.iter().all(|(key, value)| {
        observed
            .get(key)
            .is_some_and(|other| values_equivalent(value, other))
    })
}

/// Compares a declared metric alert against the observed one.
pub fn metric_alert_drift(declared: &MetricAlertRule, observed: &MetricAlertRule) -> Drift {
    let mut drift = Drift::default();
    drift.required("name", &declared.name, &observed.name);
    drift.optional("environment", declared.environment.as_deref(), observed.environment.as_deref());
    drift.optional("dataset", declared.dataset.as_deref(), observed.dataset.as_deref());
    drift.required("query", &declared.query, &observed.query);
    drift.required("aggregate", &declared.aggregate, &observed.aggregate);
    drift.required("time_window", &declared.time_window, &observed.time_window);
    drift.required("threshold_type", &declared.threshold_type, &observed.threshold_type);
    drift.optional(
        "resolve_threshold",
        declared.resolve_threshold.as_ref(),
        observed.resolve_threshold.as_ref(),
    );
    drift.optional("owner", declared.owner.as_deref(), observed.owner.as_deref());
    if !declared.projects.is_empty() {
        drift.required("projects", &declared.projects, &observed.projects);
    }

    if declared.triggers.len() != observed.triggers.len() {
        drift.record("triggers");
        return drift;
    }
    for (index, (declared, observed)) in declared.triggers.iter().zip(&observed.triggers).enumerate() {
        compare_trigger(&mut drift, index, declared, observed);
    }
    drift
}

fn compare_trigger(drift: &mut Drift, index: usize, declared: &Trigger, observed: &Trigger) {
    let path = |field: &str| format!("triggers[{index}].{field}");
    drift.optional(&path("id"), declared.id.as_deref(), observed.id.as_deref());
    drift.required(&path("label"), &declared.label, &observed.label);
    drift.required(&path("threshold_type"), &declared.threshold_type, &observed.threshold_type);
    drift.required(&path("alert_threshold"), &declared.alert_threshold, &observed.alert_threshold);
    drift.optional(
        &path("resolve_threshold"),
        declared.resolve_threshold.as_ref(),
        observed.resolve_threshold.as_ref(),
    );
    if !same_action_set(&declared.actions, &observed.actions) {
        drift.record(path("actions"));
    }
}

/// True when `observed` matches `declared` field by field, ignoring fields
/// the declaration leaves unset.
pub fn action_matches(declared: &TriggerAction, observed: &TriggerAction) -> bool {
    fn field<T: PartialEq>(declared: &Option<T>, observed: &Option<T>) -> bool {
        declared.is_none() || declared == observed
    }

    declared.action_type == observed.action_type
        && field(&declared.id, &observed.id)
        && field(&declared.alert_rule_trigger_id, &observed.alert_rule_trigger_id)
        && field(&declared.target_type, &observed.target_type)
        && field(&declared.target_identifier, &observed.target_identifier)
        && field(&declared.input_channel_id, &observed.input_channel_id)
        && field(&declared.integration_id, &observed.integration_id)
        && field(&declared.sentry_app_id, &observed.sentry_app_id)
        && field(&declared.description, &observed.description)
}

/// Multiset comparison: each declared action claims a distinct observed one.
fn same_action_set(declared: &[TriggerAction], observed: &[TriggerAction]) -> bool {
    if declared.len() != observed.len() {
        return false;
    }
    let mut claimed = vec![false; observed.len()];
    declared.iter().all(|action| {
        let found =
            (0..observed.len()).find(|&i| !claimed[i] && action_matches(action, &observed[i]));
        match found {
            Some(i) => {
                claimed[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Copies server-assigned trigger and trigger action ids into a declaration
/// that lacks them.
///
/// Triggers are matched by label, actions by [`action_matches`]. Ids the
/// declaration already carries are kept.
pub fn adopt_metric_alert_ids(declared: &mut MetricAlertRule, observed: &MetricAlertRule) {
    if declared.internal_id.is_none() {
        declared.internal_id.clone_from(&observed.internal_id);
    }
    for trigger in &mut declared.triggers {
        let Some(remote) = observed.trigger(&trigger.label) else {
            continue;
        };
        if trigger.id.is_none() {
            trigger.id.clone_from(&remote.id);
        }
        if trigger.alert_rule_id.is_none() {
            trigger.alert_rule_id.clone_from(&remote.alert_rule_id);
        }

        let mut claimed = vec![false; remote.actions.len()];
        // Actions that already carry an id claim their counterpart first
        for action in trigger.actions.iter().filter(|a| a.id.is_some()) {
            if let Some(i) = remote.actions.iter().position(|r| r.id == action.id) {
                claimed[i] = true;
            }
        }
        for action in trigger.actions.iter_mut().filter(|a| a.id.is_none()) {
            let found = (0..remote.actions.len())
                .find(|&i| !claimed[i] && action_matches(action, &remote.actions[i]));
            if let Some(i) = found {
                claimed[i] = true;
                action.id.clone_from(&remote.actions[i].id);
                action
                    .alert_rule_trigger_id
                    .clone_from(&remote.actions[i].alert_rule_trigger_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Condition, ConditionKind, FrequencyParams, MatchMode, TriggerActionType,
    };

    fn email(target: &str) -> TriggerAction {
        TriggerAction::new(TriggerActionType::Email).with_target("team", target)
    }

    fn served(mut action: TriggerAction, id: &str) -> TriggerAction {
        action.id = Some(id.into());
        action.alert_rule_trigger_id = Some("11".into());
        action
    }

    fn metric_rule(actions: Vec<TriggerAction>) -> MetricAlertRule {
        let mut trigger = Trigger::new("critical", 0, 100.0);
        trigger.actions = actions;
        MetricAlertRule {
            aggregate: "count()".into(),
            time_window: 10.0,
            triggers: vec![trigger],
            ..MetricAlertRule::new("acme", "backend", "spike")
        }
    }

    #[test]
    fn test_unset_optionals_are_not_drift() {
        let declared = IssueAlertRule {
            action_match: Some(MatchMode::Any),
            ..IssueAlertRule::new("acme", "backend", "errors")
        };
        let observed = IssueAlertRule {
            frequency: Some(30),
            environment: Some("production".into()),
            projects: vec!["backend".into()],
            internal_id: Some("9".into()),
            ..declared.clone()
        };
        assert!(issue_alert_drift(&declared, &observed).unwrap().is_empty());
    }

    #[test]
    fn test_condition_numbers_compare_by_value() {
        let declared = IssueAlertRule {
            conditions: vec![Condition::new(ConditionKind::EventFrequency(
                FrequencyParams::new("100.0", "1h"),
            ))],
            ..IssueAlertRule::new("acme", "backend", "errors")
        };
        let mut observed = declared.clone();
        observed.conditions[0] = Condition::new(ConditionKind::EventFrequency(
            FrequencyParams::new("100", "1h").comparison_type("count"),
        ))
        .named("The issue is seen more than 100 times in 1h");
        assert!(issue_alert_drift(&declared, &observed).unwrap().is_empty());

        observed.conditions[0] =
            Condition::new(ConditionKind::EventFrequency(FrequencyParams::new("100", "1d")));
        let drift = issue_alert_drift(&declared, &observed).unwrap();
        assert_eq!(drift.fields(), ["conditions[0]"]);
    }

    #[test]
    fn test_observed_component_missing_attribute_is_drift() {
        let declared = IssueAlertRule {
            conditions: vec![Condition::new(ConditionKind::EventFrequency(
                FrequencyParams::new("100", "1h"),
            ))],
            ..IssueAlertRule::new("acme", "backend", "errors")
        };
        let mut observed = declared.clone();
        observed.conditions[0] =
            Condition::new(ConditionKind::EventFrequency(FrequencyParams::new("100", "")));

        let drift = issue_alert_drift(&declared, &observed).unwrap();
        assert_eq!(drift.fields(), ["conditions[0]"]);
    }

    #[test]
    fn test_condition_order_matters() {
        let declared = IssueAlertRule {
            conditions: vec![
                Condition::new(ConditionKind::FirstSeenEvent),
                Condition::new(ConditionKind::RegressionEvent),
            ],
            ..IssueAlertRule::new("acme", "backend", "errors")
        };
        let mut observed = declared.clone();
        observed.conditions.reverse();
        let drift = issue_alert_drift(&declared, &observed).unwrap();
        assert!(drift.contains("conditions[0]"));
        assert!(drift.contains("conditions[1]"));
    }

    #[test]
    fn test_trigger_actions_compare_as_multiset() {
        let declared = metric_rule(vec![email("1"), email("2")]);
        let observed = metric_rule(vec![served(email("2"), "21"), served(email("1"), "20")]);
        assert!(metric_alert_drift(&declared, &observed).is_empty());

        let observed = metric_rule(vec![served(email("2"), "21"), served(email("2"), "22")]);
        let drift = metric_alert_drift(&declared, &observed);
        assert_eq!(drift.fields(), ["triggers[0].actions"]);
    }

    #[test]
    fn test_adopt_ids_by_label_and_equivalence() {
        let mut declared = metric_rule(vec![email("1"), email("2")]);
        let mut observed = metric_rule(vec![served(email("2"), "21"), served(email("1"), "20")]);
        observed.triggers[0].id = Some("11".into());
        observed.triggers[0].alert_rule_id = Some("7".into());
        observed.internal_id = Some("7".into());

        adopt_metric_alert_ids(&mut declared, &observed);

        let trigger = &declared.triggers[0];
        assert_eq!(trigger.id.as_deref(), Some("11"));
        assert_eq!(trigger.alert_rule_id.as_deref(), Some("7"));
        assert_eq!(trigger.actions[0].id.as_deref(), Some("20"));
        assert_eq!(trigger.actions[1].id.as_deref(), Some("21"));
        assert_eq!(declared.internal_id.as_deref(), Some("7"));
        assert!(metric_alert_drift(&declared, &observed).is_empty());
    }

    #[test]
    fn test_threshold_change_is_drift() {
        let declared = metric_rule(vec![]);
        let mut observed = declared.clone();
        observed.triggers[0].alert_threshold = 200.0;
        observed.time_window = 60.0;
        let drift = metric_alert_drift(&declared, &observed);
        assert_eq!(drift.fields(), ["time_window", "triggers[0].alert_threshold"]);
        assert_eq!(drift.to_string(), "time_window, triggers[0].alert_threshold");
    }
}
