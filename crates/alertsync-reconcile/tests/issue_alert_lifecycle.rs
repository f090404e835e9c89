use std::sync::Arc;

use alertsync_client::IssueAlertsClient;
use alertsync_client_memory::InMemoryClient;
use alertsync_reconcile::model::{
    Action, ActionKind, Condition, ConditionKind, Filter, FilterKind, FrequencyParams,
    IssueAlertRule, MatchMode,
};
use alertsync_reconcile::{ApplyOutcome, IssueAlertReconciler, ReadOutcome, ResourceState};

fn setup() -> (Arc<InMemoryClient>, IssueAlertReconciler) {
    let client = Arc::new(InMemoryClient::new());
    let reconciler = IssueAlertReconciler::new(client.clone());
    (client, reconciler)
}

fn full_rule() -> IssueAlertRule {
    IssueAlertRule {
        action_match: Some(MatchMode::Any),
        filter_match: Some(MatchMode::Any),
        frequency: Some(30),
        environment: Some("production".into()),
        conditions: vec![
            Condition::new(ConditionKind::FirstSeenEvent),
            Condition::new(ConditionKind::RegressionEvent),
            Condition::new(ConditionKind::EventFrequency(
                FrequencyParams::new("100", "1h").comparison_type("count"),
            )),
            Condition::new(ConditionKind::EventUniqueUserFrequency(
                FrequencyParams::new("100", "1h").comparison_type("count"),
            )),
            Condition::new(ConditionKind::EventFrequencyPercent(
                FrequencyParams::new("50.0", "1h").comparison_type("count"),
            )),
        ],
        filters: vec![
            Filter::new(FilterKind::AgeComparison {
                value: "10".into(),
                time: "minute".into(),
                comparison_type: "older".into(),
            }),
            Filter::new(FilterKind::IssueOccurrences {
                value: "10".into(),
            }),
            Filter::new(FilterKind::AssignedTo {
                target_type: "Unassigned".into(),
                target_identifier: None,
            }),
            Filter::new(FilterKind::LatestRelease),
            Filter::new(FilterKind::EventAttribute {
                attribute: "message".into(),
                match_type: "co".into(),
                value: Some("test".into()),
            }),
            Filter::new(FilterKind::TaggedEvent {
                key: "key".into(),
                match_type: "co".into(),
                value: Some("value".into()),
            }),
            Filter::new(FilterKind::Level {
                match_type: "eq".into(),
                level: "50".into(),
            }),
        ],
        actions: vec![
            Action::new(ActionKind::NotifyEmail {
                target_type: "IssueOwners".into(),
                target_identifier: None,
                fallthrough_type: Some("ActiveMembers".into()),
            }),
            Action::new(ActionKind::NotifyEvent),
            Action::new(ActionKind::NotifyEventService {
                service: "mail".into(),
            }),
        ],
        ..IssueAlertRule::new("acme", "backend", "Every signal")
    }
}

#[tokio::test]
async fn create_preserves_declared_order_of_components() {
    let (_client, reconciler) = setup();
    let declared = full_rule();
    let mut state = ResourceState::planned(declared.clone());

    reconciler.create(&mut state).await.unwrap();

    let observed = &state.rule;
    assert_eq!(observed.name, "Every signal");
    assert_eq!(observed.environment.as_deref(), Some("production"));
    assert_eq!(observed.conditions.len(), 5);
    assert_eq!(observed.filters.len(), 7);
    assert_eq!(observed.actions.len(), 3);

    let kinds = |rule: &IssueAlertRule| {
        (
            rule.conditions.iter().map(|c| c.kind.clone()).collect::<Vec<_>>(),
            rule.filters.iter().map(|f| f.kind.clone()).collect::<Vec<_>>(),
            rule.actions.iter().map(|a| a.kind.clone()).collect::<Vec<_>>(),
        )
    };
    assert_eq!(kinds(observed), kinds(&declared));

    // Names are rendered by the service when not declared
    assert!(observed.conditions.iter().all(|c| c.name.is_some()));
}

#[tokio::test]
async fn read_of_missing_rule_clears_identity() {
    let (client, reconciler) = setup();
    let mut state = ResourceState::planned(full_rule());
    reconciler.create(&mut state).await.unwrap();

    let id = state.id.clone().unwrap();
    let resource_id = id.rsplit('/').next().unwrap();
    assert!(client.remove_issue_alert("acme", "backend", resource_id));

    let outcome = reconciler.read(&mut state).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Absent);
    assert!(state.id.is_none());

    // Never existed at all
    let mut ghost = ResourceState {
        id: Some("acme/backend/424242".into()),
        rule: full_rule(),
    };
    assert_eq!(reconciler.read(&mut ghost).await.unwrap(), ReadOutcome::Absent);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (client, reconciler) = setup();
    let mut state = ResourceState::planned(full_rule());
    reconciler.create(&mut state).await.unwrap();
    let id = state.id.clone();

    reconciler.delete(&mut state).await.unwrap();
    assert!(state.id.is_none());

    let mut again = ResourceState {
        id,
        rule: full_rule(),
    };
    reconciler.delete(&mut again).await.unwrap();
    assert!(again.id.is_none());
    assert_eq!(
        client.calls().iter().filter(|c| *c == "delete_issue_alert").count(),
        2
    );
}

#[tokio::test]
async fn update_of_missing_rule_is_not_found() {
    let (_client, reconciler) = setup();
    let mut state = ResourceState {
        id: Some("acme/backend/999".into()),
        rule: full_rule(),
    };

    let err = reconciler.update(&mut state).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn update_refreshes_from_server() {
    let (_client, reconciler) = setup();
    let mut state = ResourceState::planned(full_rule());
    reconciler.create(&mut state).await.unwrap();
    let id = state.id.clone();

    state.rule.name = "Renamed".into();
    state.rule.frequency = None;
    state.rule.filters.truncate(2);
    reconciler.update(&mut state).await.unwrap();

    assert_eq!(state.id, id);
    assert_eq!(state.rule.name, "Renamed");
    assert_eq!(state.rule.filters.len(), 2);
    // Server default applied again
    assert_eq!(state.rule.frequency, Some(30));
}

#[tokio::test]
async fn import_rebuilds_full_state() {
    let (_client, reconciler) = setup();
    let mut state = ResourceState::planned(full_rule());
    reconciler.create(&mut state).await.unwrap();
    let id = state.id.clone().unwrap();

    let imported = reconciler.import(&id).await.unwrap().expect("rule exists");
    assert_eq!(imported, state);
    assert_eq!(imported.rule.organization, "acme");
    assert_eq!(imported.rule.project, "backend");

    assert!(reconciler.import("acme/backend/31337").await.unwrap().is_none());
    assert!(reconciler.import("acme-backend-1").await.is_err());
}

#[tokio::test]
async fn apply_converges_and_then_is_a_no_op() {
    let (client, reconciler) = setup();
    let declared = full_rule();
    let mut state = ResourceState::planned(declared.clone());

    assert_eq!(reconciler.apply(&mut state).await.unwrap(), ApplyOutcome::Created);
    let id = state.id.clone();

    // Next pass starts from the declaration again
    state.rule = declared.clone();
    assert_eq!(reconciler.apply(&mut state).await.unwrap(), ApplyOutcome::Unchanged);
    assert_eq!(state.id, id);
    assert!(!client.calls().iter().any(|c| c == "update_issue_alert"));

    let mut changed = declared;
    changed.name = "Fewer signals".into();
    changed.conditions.swap(0, 1);
    state.rule = changed;
    match reconciler.apply(&mut state).await.unwrap() {
        ApplyOutcome::Updated(drift) => {
            assert!(drift.contains("name"));
            assert!(drift.contains("conditions[0]"));
            assert!(drift.contains("conditions[1]"));
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(state.rule.name, "Fewer signals");
    assert_eq!(state.rule.conditions[0].kind, ConditionKind::RegressionEvent);
}

#[tokio::test]
async fn apply_heals_component_missing_an_attribute() {
    let (client, reconciler) = setup();
    let declared = full_rule();
    let mut state = ResourceState::planned(declared.clone());
    reconciler.create(&mut state).await.unwrap();

    let id = state.id.clone().unwrap();
    let resource_id = id.rsplit('/').next().unwrap();
    let mut stored = client
        .get_issue_alert("acme", "backend", resource_id)
        .await
        .unwrap();
    // conditions[2] is the event frequency condition
    assert!(stored.conditions[2].remove("interval").is_some());
    client
        .update_issue_alert("acme", "backend", resource_id, &stored)
        .await
        .unwrap();

    assert_eq!(reconciler.read(&mut state).await.unwrap(), ReadOutcome::Present);

    state.rule = declared.clone();
    match reconciler.apply(&mut state).await.unwrap() {
        ApplyOutcome::Updated(drift) => assert_eq!(drift.fields(), ["conditions[2]"]),
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(state.rule.conditions[2].kind, declared.conditions[2].kind);

    state.rule = declared;
    assert_eq!(reconciler.apply(&mut state).await.unwrap(), ApplyOutcome::Unchanged);
}

#[tokio::test]
async fn list_returns_every_rule_keyed_by_identifier() {
    let client = Arc::new(InMemoryClient::new().with_page_size(2));
    let reconciler = IssueAlertReconciler::new(client.clone());

    let mut ids = Vec::new();
    for name in ["one", "two", "three"] {
        let mut state = ResourceState::planned(IssueAlertRule {
            name: name.into(),
            ..full_rule()
        });
        reconciler.create(&mut state).await.unwrap();
        ids.push(state.id.unwrap());
    }

    let rules = reconciler.list("acme", "backend").await.unwrap();
    assert_eq!(rules.len(), 3);
    for id in &ids {
        assert!(rules.contains_key(id), "missing {id}");
    }
    assert!(reconciler.list("acme", "empty").await.unwrap().is_empty());
}
