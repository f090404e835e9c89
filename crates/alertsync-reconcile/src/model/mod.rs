//! Declared alert rules.
//!
//! These are the shapes the user writes down. Ids and a few other fields are
//! only ever filled from the service.

mod issue_alert;
mod metric_alert;

pub use issue_alert::{
    Action, ActionKind, Component, Condition, ConditionKind, Filter, FilterKind, FrequencyParams,
    IssueAlertRule, MatchMode, kinds,
};
pub use metric_alert::{MetricAlertRule, Trigger, TriggerAction, TriggerActionType};
