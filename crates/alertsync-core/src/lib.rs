//! # alertsync-core
//!
//! Building blocks shared by every AlertSync crate:
//!
//! - [`id`]: composite `organization/project/resource_id` identifiers
//! - [`pagination`]: cursor pages and the [`walk_pages`] accumulator

pub mod id;
pub mod pagination;

pub use id::{CompositeId, IdentifierError, decode, encode};
pub use pagination::{Page, walk_pages};
