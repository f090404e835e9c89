//! Conditions, filters and actions of issue alerts.
//!
//! On the wire each component is a flat JSON object whose `id` key holds the
//! kind discriminator. Every kind has a fixed attribute set; attributes the
//! service adds (`uuid`, rendered labels, ...) are dropped on read.

use alertsync_client::ApiObject;
use serde_json::Value;

use super::coerce::{number_from_text, text_from_value};
use super::{MappingError, non_empty, required};
use crate::model::{
    ActionKind, Component, ConditionKind, FilterKind, FrequencyParams, kinds,
};

const DISCRIMINATOR: &str = "id";
const NAME: &str = "name";

/// A closed set of component variants sharing one wire collection.
pub(crate) trait ComponentKind: Sized {
    /// Collection name used in error messages.
    const COLLECTION: &'static str;

    fn discriminator(&self) -> &'static str;

    fn write(&self, out: &mut AttributeWriter) -> Result<(), MappingError>;

    fn read(discriminator: &str, attrs: &AttributeReader<'_>) -> Result<Self, MappingError>;
}

pub(crate) struct AttributeWriter {
    kind: &'static str,
    object: ApiObject,
    /// Skips empty attributes and keeps unparsable numbers as text instead
    /// of failing. Used to render observed components for comparison.
    lenient: bool,
}

impl AttributeWriter {
    fn new(kind: &'static str) -> Self {
        let mut object = ApiObject::new();
        object.insert(DISCRIMINATOR.into(), Value::String(kind.to_string()));
        Self {
            kind,
            object,
            lenient: false,
        }
    }

    fn text(&mut self, key: &'static str, value: &str) -> Result<(), MappingError> {
        if self.lenient {
            if !value.is_empty() {
                self.object.insert(key.into(), Value::String(value.to_string()));
            }
            return Ok(());
        }
        let value = required(self.kind, key, value)?;
        self.object.insert(key.into(), Value::String(value.to_string()));
        Ok(())
    }

    fn optional_text(&mut self, key: &'static str, value: Option<&String>) {
        if let Some(value) = non_empty(value) {
            self.object.insert(key.into(), Value::String(value));
        }
    }

    fn number(&mut self, key: &'static str, value: &str) -> Result<(), MappingError> {
        if self.lenient {
            if !value.is_empty() {
                let number = number_from_text(self.kind, key, value)
                    .unwrap_or_else(|_| Value::String(value.to_string()));
                self.object.insert(key.into(), number);
            }
            return Ok(());
        }
        let value = required(self.kind, key, value)?;
        let number = number_from_text(self.kind, key, value)?;
        self.object.insert(key.into(), number);
        Ok(())
    }
}

pub(crate) struct AttributeReader<'a> {
    object: &'a ApiObject,
}

impl AttributeReader<'_> {
    /// Text of a required attribute. A server that omits one still yields a
    /// record: the value reads back empty.
    fn text(&self, key: &str) -> String {
        self.optional_text(key).unwrap_or_default()
    }

    fn optional_text(&self, key: &str) -> Option<String> {
        self.object.get(key).and_then(text_from_value)
    }
}

impl ComponentKind for ConditionKind {
    const COLLECTION: &'static str = "condition";

    fn discriminator(&self) -> &'static str {
        ConditionKind::discriminator(self)
    }

    fn write(&self, out: &mut AttributeWriter) -> Result<(), MappingError> {
        match self {
            Self::FirstSeenEvent | Self::RegressionEvent | Self::ReappearedEvent => Ok(()),
            Self::EventFrequency(params)
            | Self::EventUniqueUserFrequency(params)
            | Self::EventFrequencyPercent(params) => {
                out.number("value", &params.value)?;
                out.optional_text("comparisonType", params.comparison_type.as_ref());
                out.text("interval", &params.interval)?;
                out.optional_text("comparisonInterval", params.comparison_interval.as_ref());
                Ok(())
            }
        }
    }

    fn read(discriminator: &str, attrs: &AttributeReader<'_>) -> Result<Self, MappingError> {
        let frequency = || FrequencyParams {
            value: attrs.text("value"),
            comparison_type: attrs.optional_text("comparisonType"),
            interval: attrs.text("interval"),
            comparison_interval: attrs.optional_text("comparisonInterval"),
        };
        Ok(match discriminator {
            kinds::FIRST_SEEN_EVENT => Self::FirstSeenEvent,
            kinds::REGRESSION_EVENT => Self::RegressionEvent,
            kinds::REAPPEARED_EVENT => Self::ReappearedEvent,
            kinds::EVENT_FREQUENCY => Self::EventFrequency(frequency()),
            kinds::EVENT_UNIQUE_USER_FREQUENCY => Self::EventUniqueUserFrequency(frequency()),
            kinds::EVENT_FREQUENCY_PERCENT => Self::EventFrequencyPercent(frequency()),
            other => return Err(unknown::<Self>(other)),
        })
    }
}

impl ComponentKind for FilterKind {
    const COLLECTION: &'static str = "filter";

    fn discriminator(&self) -> &'static str {
        FilterKind::discriminator(self)
    }

    fn write(&self, out: &mut AttributeWriter) -> Result<(), MappingError> {
        match self {
            Self::AgeComparison {
                value,
                time,
                comparison_type,
            } => {
                out.number("value", value)?;
                out.text("time", time)?;
                out.text("comparison_type", comparison_type)?;
            }
            Self::IssueOccurrences { value } => out.number("value", value)?,
            Self::AssignedTo {
                target_type,
                target_identifier,
            } => {
                out.text("targetType", target_type)?;
                out.optional_text("targetIdentifier", target_identifier.as_ref());
            }
            Self::LatestRelease => {}
            Self::EventAttribute {
                attribute,
                match_type,
                value,
            } => {
                out.text("attribute", attribute)?;
                out.text("match", match_type)?;
                out.optional_text("value", value.as_ref());
            }
            Self::TaggedEvent {
                key,
                match_type,
                value,
            } => {
                out.text("key", key)?;
                out.text("match", match_type)?;
                out.optional_text("value", value.as_ref());
            }
            Self::Level { match_type, level } => {
                out.text("match", match_type)?;
                out.number("level", level)?;
            }
        }
        Ok(())
    }

    fn read(discriminator: &str, attrs: &AttributeReader<'_>) -> Result<Self, MappingError> {
        Ok(match discriminator {
            kinds::AGE_COMPARISON => Self::AgeComparison {
                value: attrs.text("value"),
                time: attrs.text("time"),
                comparison_type: attrs.text("comparison_type"),
            },
            kinds::ISSUE_OCCURRENCES => Self::IssueOccurrences {
                value: attrs.text("value"),
            },
            kinds::ASSIGNED_TO => Self::AssignedTo {
                target_type: attrs.text("targetType"),
                target_identifier: attrs.optional_text("targetIdentifier"),
            },
            kinds::LATEST_RELEASE => Self::LatestRelease,
            kinds::EVENT_ATTRIBUTE => Self::EventAttribute {
                attribute: attrs.text("attribute"),
                match_type: attrs.text("match"),
                value: attrs.optional_text("value"),
            },
            kinds::TAGGED_EVENT => Self::TaggedEvent {
                key: attrs.text("key"),
                match_type: attrs.text("match"),
                value: attrs.optional_text("value"),
            },
            kinds::LEVEL => Self::Level {
                match_type: attrs.text("match"),
                level: attrs.text("level"),
            },
            other => return Err(unknown::<Self>(other)),
        })
    }
}

impl ComponentKind for ActionKind {
    const COLLECTION: &'static str = "action";

    fn discriminator(&self) -> &'static str {
        ActionKind::discriminator(self)
    }

    fn write(&self, out: &mut AttributeWriter) -> Result<(), MappingError> {
        match self {
            Self::NotifyEmail {
                target_type,
                target_identifier,
                fallthrough_type,
            } => {
                out.text("targetType", target_type)?;
                out.optional_text("targetIdentifier", target_identifier.as_ref());
                out.optional_text("fallthroughType", fallthrough_type.as_ref());
            }
            Self::NotifyEvent => {}
            Self::NotifyEventService { service } => out.text("service", service)?,
            Self::SlackNotify {
                workspace,
                channel,
                channel_id,
                tags,
            } => {
                out.number("workspace", workspace)?;
                out.text("channel", channel)?;
                out.optional_text("channel_id", channel_id.as_ref());
                out.optional_text("tags", tags.as_ref());
            }
        }
        Ok(())
    }

    fn read(discriminator: &str, attrs: &AttributeReader<'_>) -> Result<Self, MappingError> {
        Ok(match discriminator {
            kinds::NOTIFY_EMAIL => Self::NotifyEmail {
                target_type: attrs.text("targetType"),
                target_identifier: attrs.optional_text("targetIdentifier"),
                fallthrough_type: attrs.optional_text("fallthroughType"),
            },
            kinds::NOTIFY_EVENT => Self::NotifyEvent,
            kinds::NOTIFY_EVENT_SERVICE => Self::NotifyEventService {
                service: attrs.text("service"),
            },
            kinds::SLACK_NOTIFY => Self::SlackNotify {
                workspace: attrs.text("workspace"),
                channel: attrs.text("channel"),
                channel_id: attrs.optional_text("channel_id"),
                tags: attrs.optional_text("tags"),
            },
            other => return Err(unknown::<Self>(other)),
        })
    }
}

fn unknown<K: ComponentKind>(kind: &str) -> MappingError {
    MappingError::UnknownKind {
        collection: K::COLLECTION,
        kind: kind.to_string(),
    }
}

pub(crate) fn component_to_object<K: ComponentKind>(
    component: &Component<K>,
) -> Result<ApiObject, MappingError> {
    let mut out = AttributeWriter::new(component.kind.discriminator());
    out.optional_text(NAME, component.name.as_ref());
    component.kind.write(&mut out)?;
    Ok(out.object)
}

/// Renders a component read back from the service.
///
/// Unlike [`component_to_object`] this never fails: attributes the service
/// omitted are simply absent from the result.
pub(crate) fn observed_component_to_object<K: ComponentKind>(
    component: &Component<K>,
) -> ApiObject {
    let mut out = AttributeWriter::new(component.kind.discriminator());
    out.lenient = true;
    out.optional_text(NAME, component.name.as_ref());
    // Lenient writers do not return errors
    let _ = component.kind.write(&mut out);
    out.object
}

pub(crate) fn component_from_object<K: ComponentKind>(
    object: &ApiObject,
) -> Result<Component<K>, MappingError> {
    let discriminator = object
        .get(DISCRIMINATOR)
        .and_then(text_from_value)
        .ok_or(MappingError::MissingKind {
            collection: K::COLLECTION,
            field: DISCRIMINATOR,
        })?;
    let attrs = AttributeReader { object };
    let kind = K::read(&discriminator, &attrs)?;
    Ok(Component {
        name: attrs.optional_text(NAME),
        kind,
    })
}

pub(crate) fn components_to_objects<K: ComponentKind>(
    components: &[Component<K>],
) -> Result<Vec<ApiObject>, MappingError> {
    components.iter().map(component_to_object).collect()
}

pub(crate) fn components_from_objects<K: ComponentKind>(
    objects: &[ApiObject],
) -> Result<Vec<Component<K>>, MappingError> {
    objects.iter().map(component_from_object).collect()
}
