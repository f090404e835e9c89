use alertsync_client::IssueAlert;
use alertsync_core::CompositeId;

use super::components::{components_from_objects, components_to_objects};
use super::{MappingError, non_empty, required};
use crate::model::{IssueAlertRule, MatchMode};

const KIND: &str = "issue alert";

/// Builds the create/update payload for an issue alert.
pub fn issue_alert_to_payload(rule: &IssueAlertRule) -> Result<IssueAlert, MappingError> {
    let name = required(KIND, "name", &rule.name)?;
    let action_match = rule
        .action_match
        .ok_or_else(|| MappingError::missing(KIND, "action_match"))?;

    Ok(IssueAlert {
        name: Some(name.to_string()),
        action_match: Some(action_match.as_str().to_string()),
        filter_match: rule.filter_match.map(|m| m.as_str().to_string()),
        frequency: rule.frequency.map(i64::from),
        environment: non_empty(rule.environment.as_ref()),
        owner: non_empty(rule.owner.as_ref()),
        conditions: components_to_objects(&rule.conditions)?,
        filters: components_to_objects(&rule.filters)?,
        actions: components_to_objects(&rule.actions)?,
        ..Default::default()
    })
}

/// Rebuilds the declared shape from a server response.
///
/// Scope comes from the identifier, never from the payload.
pub fn issue_alert_from_payload(
    id: &CompositeId,
    payload: IssueAlert,
) -> Result<IssueAlertRule, MappingError> {
    Ok(IssueAlertRule {
        organization: id.organization().to_string(),
        project: id.project().to_string(),
        name: payload.name.unwrap_or_default(),
        action_match: payload
            .action_match
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(str::parse::<MatchMode>)
            .transpose()?,
        filter_match: payload
            .filter_match
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(str::parse::<MatchMode>)
            .transpose()?,
        frequency: payload.frequency.and_then(|f| u32::try_from(f).ok()),
        environment: non_empty(payload.environment.as_ref()),
        owner: non_empty(payload.owner.as_ref()),
        conditions: components_from_objects(&payload.conditions)?,
        filters: components_from_objects(&payload.filters)?,
        actions: components_from_objects(&payload.actions)?,
        projects: payload.projects,
        internal_id: payload.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Action, ActionKind, Condition, ConditionKind, Filter, FilterKind, FrequencyParams,
        MatchMode,
    };
    use serde_json::json;

    fn rule() -> IssueAlertRule {
        IssueAlertRule {
            action_match: Some(MatchMode::Any),
            filter_match: Some(MatchMode::All),
            frequency: Some(60),
            conditions: vec![
                Condition::new(ConditionKind::FirstSeenEvent),
                Condition::new(ConditionKind::EventFrequency(FrequencyParams::new("50", "1h"))),
            ],
            filters: vec![Filter::new(FilterKind::LatestRelease)],
            actions: vec![Action::new(ActionKind::NotifyEvent).named("Send a notification")],
            ..IssueAlertRule::new("acme", "backend", "New errors")
        }
    }

    #[test]
    fn test_to_payload_omits_unset_optionals() {
        let payload = issue_alert_to_payload(&rule()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["actionMatch"], "any");
        assert_eq!(value["filterMatch"], "all");
        assert_eq!(value["frequency"], 60);
        assert!(value.get("environment").is_none());
        assert!(value.get("owner").is_none());
        assert!(value.get("id").is_none());
        assert_eq!(value["conditions"][1]["value"], json!(50));
    }

    #[test]
    fn test_action_match_required() {
        let rule = IssueAlertRule {
            action_match: None,
            ..rule()
        };
        assert_eq!(
            issue_alert_to_payload(&rule).unwrap_err(),
            MappingError::missing(KIND, "action_match")
        );
    }

    #[test]
    fn test_from_payload_takes_scope_from_identifier() {
        let id: CompositeId = "acme/backend/31".parse().unwrap();
        let mut payload = issue_alert_to_payload(&rule()).unwrap();
        payload.id = Some("31".into());
        payload.projects = vec!["backend".into()];

        let back = issue_alert_from_payload(&id, payload).unwrap();
        assert_eq!(back.organization, "acme");
        assert_eq!(back.project, "backend");
        assert_eq!(back.internal_id.as_deref(), Some("31"));
        assert_eq!(back.projects, vec!["backend"]);
        assert_eq!(back.conditions, rule().conditions);
        assert_eq!(back.actions, rule().actions);
    }

    #[test]
    fn test_from_payload_tolerates_sparse_response() {
        let id: CompositeId = "acme/backend/1".parse().unwrap();
        let back = issue_alert_from_payload(&id, IssueAlert::default()).unwrap();
        assert_eq!(back.name, "");
        assert_eq!(back.action_match, None);
        assert!(back.conditions.is_empty());
    }
}
