//! Declared shape of an issue alert rule.

use std::fmt;
use std::str::FromStr;

use crate::mapping::MappingError;

/// Discriminators of every supported condition, filter and action.
pub mod kinds {
    pub const FIRST_SEEN_EVENT: &str =
        "sentry.rules.conditions.first_seen_event.FirstSeenEventCondition";
    pub const REGRESSION_EVENT: &str =
        "sentry.rules.conditions.regression_event.RegressionEventCondition";
    pub const REAPPEARED_EVENT: &str =
        "sentry.rules.conditions.reappeared_event.ReappearedEventCondition";
    pub const EVENT_FREQUENCY: &str =
        "sentry.rules.conditions.event_frequency.EventFrequencyCondition";
    pub const EVENT_UNIQUE_USER_FREQUENCY: &str =
        "sentry.rules.conditions.event_frequency.EventUniqueUserFrequencyCondition";
    pub const EVENT_FREQUENCY_PERCENT: &str =
        "sentry.rules.conditions.event_frequency.EventFrequencyPercentCondition";

    pub const AGE_COMPARISON: &str = "sentry.rules.filters.age_comparison.AgeComparisonFilter";
    pub const ISSUE_OCCURRENCES: &str =
        "sentry.rules.filters.issue_occurrences.IssueOccurrencesFilter";
    pub const ASSIGNED_TO: &str = "sentry.rules.filters.assigned_to.AssignedToFilter";
    pub const LATEST_RELEASE: &str = "sentry.rules.filters.latest_release.LatestReleaseFilter";
    pub const EVENT_ATTRIBUTE: &str = "sentry.rules.filters.event_attribute.EventAttributeFilter";
    pub const TAGGED_EVENT: &str = "sentry.rules.filters.tagged_event.TaggedEventFilter";
    pub const LEVEL: &str = "sentry.rules.filters.level.LevelFilter";

    pub const NOTIFY_EMAIL: &str = "sentry.mail.actions.NotifyEmailAction";
    pub const NOTIFY_EVENT: &str = "sentry.rules.actions.notify_event.NotifyEventAction";
    pub const NOTIFY_EVENT_SERVICE: &str =
        "sentry.rules.actions.notify_event_service.NotifyEventServiceAction";
    pub const SLACK_NOTIFY: &str =
        "sentry.integrations.slack.notify_action.SlackNotifyServiceAction";
}

/// How conditions (or filters) of a rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    Any,
    All,
    None,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::None => "none",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            "none" => Ok(Self::None),
            other => Err(MappingError::InvalidMatchMode(other.to_string())),
        }
    }
}

/// A nested rule component: its kind-specific attributes plus the display
/// name. When `name` is `None` the service renders one.
#[derive(Debug, Clone, PartialEq)]
pub struct Component<K> {
    pub name: Option<String>,
    pub kind: K,
}

impl<K> Component<K> {
    pub fn new(kind: K) -> Self {
        Self { name: None, kind }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<K> From<K> for Component<K> {
    fn from(kind: K) -> Self {
        Self::new(kind)
    }
}

pub type Condition = Component<ConditionKind>;
pub type Filter = Component<FilterKind>;
pub type Action = Component<ActionKind>;

/// Parameters shared by the event frequency conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyParams {
    /// Threshold, numeric on the wire.
    pub value: String,
    /// `count` or `percent`.
    pub comparison_type: Option<String>,
    /// Window such as `1m`, `1h`, `1d`.
    pub interval: String,
    pub comparison_interval: Option<String>,
}

impl FrequencyParams {
    pub fn new(value: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            interval: interval.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn comparison_type(mut self, comparison_type: impl Into<String>) -> Self {
        self.comparison_type = Some(comparison_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    FirstSeenEvent,
    RegressionEvent,
    ReappearedEvent,
    EventFrequency(FrequencyParams),
    EventUniqueUserFrequency(FrequencyParams),
    EventFrequencyPercent(FrequencyParams),
}

impl ConditionKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::FirstSeenEvent => kinds::FIRST_SEEN_EVENT,
            Self::RegressionEvent => kinds::REGRESSION_EVENT,
            Self::ReappearedEvent => kinds::REAPPEARED_EVENT,
            Self::EventFrequency(_) => kinds::EVENT_FREQUENCY,
            Self::EventUniqueUserFrequency(_) => kinds::EVENT_UNIQUE_USER_FREQUENCY,
            Self::EventFrequencyPercent(_) => kinds::EVENT_FREQUENCY_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    AgeComparison {
        /// Age, numeric on the wire.
        value: String,
        /// `minute`, `hour`, `day` or `week`.
        time: String,
        /// `older` or `newer`.
        comparison_type: String,
    },
    IssueOccurrences {
        value: String,
    },
    AssignedTo {
        /// `Unassigned`, `Team` or `Member`.
        target_type: String,
        target_identifier: Option<String>,
    },
    LatestRelease,
    EventAttribute {
        attribute: String,
        match_type: String,
        value: Option<String>,
    },
    TaggedEvent {
        key: String,
        match_type: String,
        value: Option<String>,
    },
    Level {
        match_type: String,
        /// Numeric log level (`50` is fatal).
        level: String,
    },
}

impl FilterKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::AgeComparison { .. } => kinds::AGE_COMPARISON,
            Self::IssueOccurrences { .. } => kinds::ISSUE_OCCURRENCES,
            Self::AssignedTo { .. } => kinds::ASSIGNED_TO,
            Self::LatestRelease => kinds::LATEST_RELEASE,
            Self::EventAttribute { .. } => kinds::EVENT_ATTRIBUTE,
            Self::TaggedEvent { .. } => kinds::TAGGED_EVENT,
            Self::Level { .. } => kinds::LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    NotifyEmail {
        /// `IssueOwners`, `Team` or `Member`.
        target_type: String,
        target_identifier: Option<String>,
        fallthrough_type: Option<String>,
    },
    NotifyEvent,
    NotifyEventService {
        service: String,
    },
    SlackNotify {
        /// Integration id, numeric on the wire.
        workspace: String,
        channel: String,
        channel_id: Option<String>,
        tags: Option<String>,
    },
}

impl ActionKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::NotifyEmail { .. } => kinds::NOTIFY_EMAIL,
            Self::NotifyEvent => kinds::NOTIFY_EVENT,
            Self::NotifyEventService { .. } => kinds::NOTIFY_EVENT_SERVICE,
            Self::SlackNotify { .. } => kinds::SLACK_NOTIFY,
        }
    }
}

/// An issue alert as the user declares it.
///
/// `projects` and `internal_id` are observed only: they are filled by reads
/// and never sent to the service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssueAlertRule {
    pub organization: String,
    pub project: String,
    pub name: String,
    /// Required to create a rule.
    pub action_match: Option<MatchMode>,
    pub filter_match: Option<MatchMode>,
    /// Minutes between notifications; the service defaults it when unset.
    pub frequency: Option<u32>,
    pub environment: Option<String>,
    pub owner: Option<String>,
    pub conditions: Vec<Condition>,
    pub filters: Vec<Filter>,
    pub actions: Vec<Action>,
    pub projects: Vec<String>,
    pub internal_id: Option<String>,
}

impl IssueAlertRule {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}
