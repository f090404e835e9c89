//! Trigger actions.
//!
//! The service has spelled trigger action keys both in snake_case and
//! camelCase across API versions, and sends ids as either numbers or
//! strings. Decoding folds every key to a canonical form first and then
//! assigns into the fixed [`TriggerAction`] record.

use std::collections::HashMap;

use alertsync_client::ApiObject;
use serde_json::Value;

use super::MappingError;
use super::coerce::{i64_from_value, text_from_value};
use crate::model::{TriggerAction, TriggerActionType};

/// Folds a key for matching: separators dropped, case ignored.
///
/// ```
/// use alertsync_reconcile::mapping::fold_key;
///
/// assert_eq!(fold_key("target_identifier"), fold_key("targetIdentifier"));
/// assert_eq!(fold_key("Input-Channel-ID"), "inputchannelid");
/// ```
pub fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decodes a trigger action permissively.
///
/// Unknown keys are ignored and fields with no matching key stay `None`.
/// Only the `type` discriminator is mandatory.
pub fn trigger_action_from_object(object: &ApiObject) -> Result<TriggerAction, MappingError> {
    let mut fields: HashMap<String, &Value> = HashMap::with_capacity(object.len());
    for (key, value) in object {
        // First spelling wins when two keys fold to the same name
        fields.entry(fold_key(key)).or_insert(value);
    }
    let text = |key: &str| fields.get(key).and_then(|v| text_from_value(v));

    let action_type: TriggerActionType = text("type")
        .ok_or(MappingError::MissingKind {
            collection: "trigger action",
            field: "type",
        })?
        .parse()?;

    Ok(TriggerAction {
        id: text("id"),
        alert_rule_trigger_id: text("alertruletriggerid"),
        action_type,
        target_type: text("targettype"),
        target_identifier: text("targetidentifier"),
        input_channel_id: text("inputchannelid"),
        integration_id: fields.get("integrationid").and_then(|v| i64_from_value(v)),
        sentry_app_id: text("sentryappid"),
        description: text("description"),
    })
}

/// Encodes a trigger action with the API's camelCase keys. Unset fields are
/// omitted.
pub fn trigger_action_to_object(action: &TriggerAction) -> ApiObject {
    let mut object = ApiObject::new();
    let mut put = |key: &str, value: Option<&String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            object.insert(key.into(), Value::String(value.clone()));
        }
    };
    put("id", action.id.as_ref());
    put("alertRuleTriggerId", action.alert_rule_trigger_id.as_ref());
    put("targetType", action.target_type.as_ref());
    put("targetIdentifier", action.target_identifier.as_ref());
    put("inputChannelId", action.input_channel_id.as_ref());
    put("sentryAppId", action.sentry_app_id.as_ref());
    put("description", action.description.as_ref());

    object.insert(
        "type".into(),
        Value::String(action.action_type.as_str().to_string()),
    );
    if let Some(integration_id) = action.integration_id {
        object.insert("integrationId".into(), Value::from(integration_id));
    }
    object
}
