//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Identity, Relationship, RelationshipId};

/// Trait for storing and retrieving relationships
///
/// Implemented by the infrastructure layer (rapport-store)
pub trait RelationshipStore {
    /// Error type for store operations
    type Error;

    /// Get a relationship by ID
    fn get_relationship(&self, id: RelationshipId) -> Result<Option<Relationship>, Self::Error>;

    /// Get every relationship the identity participates in
    ///
    /// Returns `None` when the store does not know the identity.
    fn get_relationships_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Vec<Relationship>>, Self::Error>;

    /// Same as [`get_relationships_by_identity`](Self::get_relationships_by_identity),
    /// keyed by the raw identity identifier
    fn get_relationships_by_identity_id(
        &self,
        id: &str,
    ) -> Result<Option<Vec<Relationship>>, Self::Error>;

    /// Get the counterpart identities across all of an identity's relationships
    fn get_relationship_identities_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Identity>, Self::Error>;

    /// Insert or update a relationship with its properties
    fn save_relationship(&mut self, relationship: &Relationship) -> Result<(), Self::Error>;

    /// Delete a relationship with its properties
    fn remove_relationship(&mut self, relationship: &Relationship) -> Result<(), Self::Error>;
}

/// Trait for listing the identities known to a provider
///
/// Implemented by the infrastructure layer (rapport-store)
pub trait IdentityDirectory {
    /// Error type for directory operations
    type Error;

    /// Get every identity registered under `provider_id`
    fn get_identities(&self, provider_id: &str) -> Result<Vec<Identity>, Self::Error>;
}
