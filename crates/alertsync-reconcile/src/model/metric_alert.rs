//! Declared shape of a metric alert rule.

use std::fmt;
use std::str::FromStr;

use crate::mapping::{MappingError, fold_key};

/// Kind of notification a trigger action sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerActionType {
    Email,
    Slack,
    PagerDuty,
    MsTeams,
    Opsgenie,
    Discord,
    SentryApp,
}

impl TriggerActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Slack => "slack",
            Self::PagerDuty => "pagerduty",
            Self::MsTeams => "msteams",
            Self::Opsgenie => "opsgenie",
            Self::Discord => "discord",
            Self::SentryApp => "sentry_app",
        }
    }
}

impl fmt::Display for TriggerActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerActionType {
    type Err = MappingError;

    /// Accepts the wire spelling in any case, with or without the underscore.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "email" => Ok(Self::Email),
            "slack" => Ok(Self::Slack),
            "pagerduty" => Ok(Self::PagerDuty),
            "msteams" => Ok(Self::MsTeams),
            "opsgenie" => Ok(Self::Opsgenie),
            "discord" => Ok(Self::Discord),
            "sentryapp" => Ok(Self::SentryApp),
            _ => Err(MappingError::UnknownKind {
                collection: "trigger action",
                kind: s.to_string(),
            }),
        }
    }
}

/// A notification attached to a trigger.
///
/// `id` and `alert_rule_trigger_id` are assigned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerAction {
    pub id: Option<String>,
    pub alert_rule_trigger_id: Option<String>,
    pub action_type: TriggerActionType,
    pub target_type: Option<String>,
    pub target_identifier: Option<String>,
    pub input_channel_id: Option<String>,
    pub integration_id: Option<i64>,
    pub sentry_app_id: Option<String>,
    pub description: Option<String>,
}

impl TriggerAction {
    pub fn new(action_type: TriggerActionType) -> Self {
        Self {
            id: None,
            alert_rule_trigger_id: None,
            action_type,
            target_type: None,
            target_identifier: None,
            input_channel_id: None,
            integration_id: None,
            sentry_app_id: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_target(
        mut self,
        target_type: impl Into<String>,
        target_identifier: impl Into<String>,
    ) -> Self {
        self.target_type = Some(target_type.into());
        self.target_identifier = Some(target_identifier.into());
        self
    }

    #[must_use]
    pub fn with_integration(mut self, integration_id: i64) -> Self {
        self.integration_id = Some(integration_id);
        self
    }
}

/// A threshold inside a metric alert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trigger {
    pub id: Option<String>,
    pub alert_rule_id: Option<String>,
    /// `critical` or `warning`; unique within a rule.
    pub label: String,
    pub threshold_type: i64,
    pub alert_threshold: f64,
    /// Falls back to the rule-level value on the service when unset.
    pub resolve_threshold: Option<f64>,
    pub actions: Vec<TriggerAction>,
}

impl Trigger {
    pub fn new(label: impl Into<String>, threshold_type: i64, alert_threshold: f64) -> Self {
        Self {
            label: label.into(),
            threshold_type,
            alert_threshold,
            ..Default::default()
        }
    }
}

/// A metric alert as the user declares it.
///
/// The service stores a list of projects; a rule managed here is scoped to
/// exactly one, exposed through [`MetricAlertRule::project`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricAlertRule {
    pub organization: String,
    pub projects: Vec<String>,
    pub name: String,
    pub environment: Option<String>,
    /// `events` when unset.
    pub dataset: Option<String>,
    pub query: String,
    pub aggregate: String,
    /// Minutes.
    pub time_window: f64,
    pub threshold_type: i64,
    pub resolve_threshold: Option<f64>,
    pub owner: Option<String>,
    pub triggers: Vec<Trigger>,
    pub internal_id: Option<String>,
}

impl MetricAlertRule {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            projects: vec![project.into()],
            name: name.into(),
            ..Default::default()
        }
    }

    /// The single project this rule is scoped to, if it has exactly one.
    pub fn project(&self) -> Option<&str> {
        match self.projects.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn trigger(&self, label: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_requires_single_entry() {
        let mut rule = MetricAlertRule::new("acme", "backend", "latency");
        assert_eq!(rule.project(), Some("backend"));

        rule.projects.push("frontend".into());
        assert_eq!(rule.project(), None);

        rule.projects.clear();
        assert_eq!(rule.project(), None);
    }

    #[test]
    fn test_action_type_parse() {
        assert_eq!("email".parse::<TriggerActionType>().unwrap(), TriggerActionType::Email);
        assert_eq!(
            "sentry_app".parse::<TriggerActionType>().unwrap(),
            TriggerActionType::SentryApp
        );
        assert_eq!(
            "PagerDuty".parse::<TriggerActionType>().unwrap(),
            TriggerActionType::PagerDuty
        );
        assert!(matches!(
            "carrier_pigeon".parse::<TriggerActionType>(),
            Err(MappingError::UnknownKind { .. })
        ));
    }
}
