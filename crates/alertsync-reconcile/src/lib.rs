//! # alertsync-reconcile
//!
//! Keeps declared alert rules and the remote alerting service in sync.
//!
//! - [`model`]: the declared shape of issue and metric alerts
//! - [`mapping`]: translation between declared rules and API payloads
//! - [`drift`]: declared vs observed comparison
//! - [`Reconciler`]: create/read/update/delete/import/apply per rule
//! - [`project_slugs`]: project id to slug lookup across all pages
//! - [`observability`]: config-driven log filter setup
//!
//! ## Example
//!
//! ```ignore
//! use alertsync_reconcile::{MetricAlertReconciler, ResourceState};
//!
//! let reconciler = MetricAlertReconciler::new(client);
//! let mut state = ResourceState::planned(rule);
//! reconciler.create(&mut state).await?;
//! assert_eq!(state.rule.project(), Some("backend"));
//! ```

pub mod config;
pub mod drift;
mod error;
mod lookup;
pub mod mapping;
pub mod model;
pub mod observability;
mod reconciler;

pub use config::{AlertSyncConfig, LoggingConfig, ReconcileSettings};
pub use drift::Drift;
pub use error::{ErrorCategory, ReconcileError};
pub use lookup::project_slugs;
pub use mapping::MappingError;
pub use reconciler::{
    AlertKind, ApplyOutcome, IssueAlertReconciler, IssueAlerts, MetricAlertReconciler,
    MetricAlerts, ReadOutcome, Reconciler, ResourceState,
};
