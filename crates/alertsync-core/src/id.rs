//! Composite resource identifiers.
//!
//! Alert rules live inside an organization and a project, but the remote
//! service only hands back a bare resource id. State stores persist a single
//! string, so the three parts are joined into one opaque identifier:
//!
//! - Issue alert: `my-org/backend/12345`
//! - Metric alert: `my-org/backend/678`
//!
//! # Example
//!
//! ```
//! use alertsync_core::id::CompositeId;
//!
//! let id = CompositeId::new("my-org", "backend", "12345").unwrap();
//! assert_eq!(id.to_string(), "my-org/backend/12345");
//!
//! let parsed: CompositeId = "my-org/backend/12345".parse().unwrap();
//! assert_eq!(parsed, id);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator between identifier segments.
pub const SEPARATOR: char = '/';

/// Errors produced while building or parsing a composite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The identifier is not made of exactly three valid segments.
    #[error("Malformed identifier '{input}': {reason}")]
    Malformed {
        /// The offending input.
        input: String,
        /// Why the input was rejected.
        reason: String,
    },
}

impl IdentifierError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// An `organization/project/resource_id` triple.
///
/// Once built, the identifier is never mutated: updates reuse it, reads and
/// deletes parse it back to recover the scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    organization: String,
    project: String,
    resource_id: String,
}

impl CompositeId {
    /// Builds an identifier, validating every segment.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Malformed` if a segment is empty or contains
    /// the separator.
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let id = Self {
            organization: organization.into(),
            project: project.into(),
            resource_id: resource_id.into(),
        };

        for (segment, value) in [
            ("organization", &id.organization),
            ("project", &id.project),
            ("resource id", &id.resource_id),
        ] {
            validate_segment(segment, value)
                .map_err(|reason| IdentifierError::malformed(id.encode_unchecked(), reason))?;
        }

        Ok(id)
    }

    /// The organization slug.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// The project slug.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The id assigned by the remote service.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Splits the identifier into `(organization, project, resource_id)`.
    pub fn into_parts(self) -> (String, String, String) {
        (self.organization, self.project, self.resource_id)
    }

    fn encode_unchecked(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.organization, self.project, self.resource_id
        )
    }
}

fn validate_segment(segment: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{segment} is empty"));
    }
    if value.contains(SEPARATOR) {
        return Err(format!("{segment} contains '{SEPARATOR}'"));
    }
    Ok(())
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_unchecked())
    }
}

impl FromStr for CompositeId {
    type Err = IdentifierError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(IdentifierError::malformed(
                input,
                format!("expected 3 segments, found {}", parts.len()),
            ));
        }

        if let Some(position) = parts.iter().position(|p| p.is_empty()) {
            return Err(IdentifierError::malformed(
                input,
                format!("segment {} is empty", position + 1),
            ));
        }

        Ok(Self {
            organization: parts[0].to_string(),
            project: parts[1].to_string(),
            resource_id: parts[2].to_string(),
        })
    }
}

/// Encodes three segments into a composite identifier string.
///
/// # Errors
///
/// Returns `IdentifierError::Malformed` if a segment is empty or contains
/// the separator.
pub fn encode(organization: &str, project: &str, resource_id: &str) -> Result<String, IdentifierError> {
    CompositeId::new(organization, project, resource_id).map(|id| id.to_string())
}

/// Decodes a composite identifier string into its segments.
///
/// # Errors
///
/// Returns `IdentifierError::Malformed` unless the input splits into exactly
/// three non-empty segments.
pub fn decode(input: &str) -> Result<(String, String, String), IdentifierError> {
    input.parse::<CompositeId>().map(CompositeId::into_parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let triples = [
            ("my-org", "backend", "12345"),
            ("o", "p", "1"),
            ("acme_inc", "web.frontend", "abc-def"),
        ];
        for (org, project, id) in triples {
            let encoded = encode(org, project, id).unwrap();
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded, (org.to_string(), project.to_string(), id.to_string()));
        }
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        for input in ["", "org", "org/project", "org/project/id/extra", "a/b/c/d/e"] {
            let err = decode(input).unwrap_err();
            assert!(matches!(err, IdentifierError::Malformed { .. }), "{input}");
        }
    }

    #[test]
    fn test_decode_rejects_empty_segments() {
        for input in ["/project/id", "org//id", "org/project/", "//"] {
            assert!(decode(input).is_err(), "{input}");
        }
    }

    #[test]
    fn test_new_rejects_separator_in_segment() {
        let err = CompositeId::new("my/org", "backend", "1").unwrap_err();
        assert!(err.to_string().contains("organization contains '/'"));

        let err = CompositeId::new("org", "", "1").unwrap_err();
        assert!(err.to_string().contains("project is empty"));
    }

    #[test]
    fn test_accessors() {
        let id: CompositeId = "my-org/backend/42".parse().unwrap();
        assert_eq!(id.organization(), "my-org");
        assert_eq!(id.project(), "backend");
        assert_eq!(id.resource_id(), "42");
    }
}
