//! Manager error types

use rapport_domain::{IdentityId, RelationshipId};
use thiserror::Error;

/// Boxed error coming from a store or identity directory implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during relationship operations
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Both sides of the relationship are the same identity
    #[error("The two identities are the same: {0}")]
    SelfRelationship(IdentityId),

    /// A property was initiated by someone outside the relationship
    #[error(
        "Property '{property}' initiator {initiator} is not a member of relationship {relationship}"
    )]
    NonMemberInitiator {
        /// Relationship being saved
        relationship: RelationshipId,
        /// Name of the offending property
        property: String,
        /// Identity recorded as initiator
        initiator: IdentityId,
    },

    /// Relationship store failure
    #[error("Store error: {0}")]
    Store(#[source] BoxError),

    /// Identity directory failure
    #[error("Identity directory error: {0}")]
    Directory(#[source] BoxError),

    /// A lifecycle listener failed; later listeners were not notified
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

impl ManagerError {
    /// Whether the error comes from relationship validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ManagerError::SelfRelationship(_) | ManagerError::NonMemberInitiator { .. }
        )
    }
}

/// Failure reported by a lifecycle listener
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener '{listener}' failed: {message}")]
pub struct ListenerError {
    /// Name of the failing listener
    pub listener: String,
    /// What went wrong
    pub message: String,
}

impl ListenerError {
    /// Create a new listener error
    pub fn new(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            message: message.into(),
        }
    }
}
