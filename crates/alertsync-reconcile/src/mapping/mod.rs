//! Translation between declared rules and API payloads.
//!
//! Each direction is a pure function. Writing a rule fails on declarations
//! the service would reject (missing required attributes, non-numeric
//! thresholds); reading accepts anything a valid server response contains,
//! including values whose JSON type differs from the declared one.

mod coerce;
mod components;
mod issue_alert;
mod metric_alert;
mod trigger_action;

use thiserror::Error;

pub(crate) use components::{
    ComponentKind, component_to_object, observed_component_to_object,
};
pub use issue_alert::{issue_alert_from_payload, issue_alert_to_payload};
pub use metric_alert::{metric_alert_from_payload, metric_alert_to_payload};
pub use trigger_action::{fold_key, trigger_action_from_object, trigger_action_to_object};

pub(crate) use coerce::values_equivalent;

/// Errors raised while translating between declared rules and payloads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("Unknown {collection} kind '{kind}'")]
    UnknownKind {
        collection: &'static str,
        kind: String,
    },

    #[error("{collection} entry has no '{field}' discriminator")]
    MissingKind {
        collection: &'static str,
        field: &'static str,
    },

    #[error("{kind} requires '{attribute}'")]
    MissingAttribute {
        kind: String,
        attribute: &'static str,
    },

    #[error("{kind} attribute '{attribute}' is not a number: '{value}'")]
    InvalidNumber {
        kind: String,
        attribute: &'static str,
        value: String,
    },

    #[error("Invalid match mode '{0}', expected one of any, all, none")]
    InvalidMatchMode(String),

    #[error("Response for {0} carries no id")]
    MissingResourceId(&'static str),

    #[error("Metric alert must target exactly one project, found {0}")]
    ProjectScope(usize),
}

impl MappingError {
    pub fn missing(kind: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            kind: kind.into(),
            attribute,
        }
    }
}

/// Returns `value` unless it is empty.
pub(crate) fn required<'a>(
    kind: &str,
    attribute: &'static str,
    value: &'a str,
) -> Result<&'a str, MappingError> {
    if value.is_empty() {
        Err(MappingError::missing(kind, attribute))
    } else {
        Ok(value)
    }
}

/// Drops empty strings so unset optionals never reach the wire.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
