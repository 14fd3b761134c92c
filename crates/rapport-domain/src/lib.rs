//! Rapport Domain Layer
//!
//! This crate contains the domain model for Rapport, the relationship manager.
//! Its only external dependency is `uuid` for identifiers; it defines the value
//! types and the trait interfaces that the other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Identity**: a user or profile, unique by id, scoped by provider and remote id
//! - **Relationship**: a link between two identities with a persisted status
//! - **Property**: one facet of a relationship, with its own status and initiator
//! - **Viewer status**: how a relationship looks from one participant's side
//!
//! ## Architecture
//!
//! - Pure domain logic only
//! - Storage and identity directory implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod identity;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use identity::{Identity, IdentityId};
pub use relationship::{Property, Relationship, RelationshipId, RelationshipStatus, ViewerStatus};
