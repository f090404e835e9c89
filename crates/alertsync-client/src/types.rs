//! API payload types.
//!
//! These mirror the JSON the remote service accepts and returns. Top-level
//! rule fields are typed; nested rule components and trigger actions stay
//! loosely typed ([`ApiObject`]) because their shape depends on a
//! discriminator and the service adds fields over time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// A loosely-typed JSON object.
pub type ApiObject = Map<String, Value>;

/// An issue alert rule as exchanged with the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAlert {
    /// Server-assigned id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `any`, `all` or `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_match: Option<String>,
    /// Minimum minutes between two notifications for the same issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ApiObject>,
    #[serde(default)]
    pub filters: Vec<ApiObject>,
    #[serde(default)]
    pub actions: Vec<ApiObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub date_created: Option<OffsetDateTime>,
}

/// A metric alert rule as exchanged with the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(rename = "dataset", skip_serializing_if = "Option::is_none")]
    pub data_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    /// Evaluation window in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_threshold: Option<f64>,
    #[serde(default)]
    pub triggers: Vec<MetricAlertTrigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub date_created: Option<OffsetDateTime>,
}

/// A trigger inside a metric alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlertTrigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_threshold: Option<f64>,
    /// Trigger actions; their field naming varies between API versions.
    #[serde(default)]
    pub actions: Vec<ApiObject>,
}

/// A project as returned by the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Project {
    /// Creates a new `Project`.
    #[must_use]
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_alert_wire_names() {
        let alert = MetricAlert {
            name: Some("p95 latency".into()),
            data_set: Some("transactions".into()),
            time_window: Some(10.0),
            threshold_type: Some(0),
            ..Default::default()
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["dataset"], "transactions");
        assert_eq!(value["timeWindow"], 10.0);
        assert_eq!(value["thresholdType"], 0);
        assert!(value.get("environment").is_none());
        assert!(value.get("projects").is_none());
    }

    #[test]
    fn test_issue_alert_tolerates_nulls_and_extra_fields() {
        let alert: IssueAlert = serde_json::from_value(json!({
            "id": "12",
            "name": "errors",
            "actionMatch": "any",
            "filterMatch": null,
            "environment": null,
            "frequency": 30,
            "conditions": [{"id": "x", "uuid": "3f2a"}],
            "snooze": false,
            "dateCreated": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(alert.id.as_deref(), Some("12"));
        assert!(alert.filter_match.is_none());
        assert!(alert.environment.is_none());
        assert!(alert.filters.is_empty());
        assert_eq!(alert.conditions[0]["uuid"], "3f2a");
        assert!(alert.date_created.is_some());
    }
}
