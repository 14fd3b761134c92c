//! Relationship module - pairwise social links between identities

use crate::{Identity, IdentityId};
use std::fmt;

/// Unique identifier for a relationship record (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipId(u128);

impl RelationshipId {
    /// Generate a new UUIDv7-based RelationshipId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RelationshipId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RelationshipId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid relationship id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Persisted status of a relationship or of one of its properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipStatus {
    /// Invitation sent, waiting for the invitee
    Pending,

    /// Both sides are connected
    Confirm,

    /// The invitee chose to ignore the invitation
    Ignore,
}

impl RelationshipStatus {
    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Confirm => "confirm",
            RelationshipStatus::Ignore => "ignore",
        }
    }

    /// Parse a status from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(RelationshipStatus::Pending),
            "confirm" => Some(RelationshipStatus::Confirm),
            "ignore" => Some(RelationshipStatus::Ignore),
            _ => None,
        }
    }
}

impl std::str::FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid relationship status: {}", s))
    }
}

/// Status of a relationship as seen by one identity
///
/// Computed on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerStatus {
    /// No relationship, or one that the viewer should not see as a link
    Alien,

    /// The viewer sent an invitation that is still waiting
    Pending,

    /// The viewer received an invitation and must answer it
    RequireValidation,

    /// The viewer and the other side are connected
    Confirm,
}

impl ViewerStatus {
    /// Resolve the status of `relationship` from the point of view of `viewer`
    ///
    /// An ignored relationship resolves to `Alien`, the same as no relationship
    /// at all. A relationship whose status was never set also resolves to
    /// `Alien`.
    pub fn resolve(relationship: Option<&Relationship>, viewer: &Identity) -> Self {
        let Some(relationship) = relationship else {
            return ViewerStatus::Alien;
        };

        match relationship.status {
            Some(RelationshipStatus::Pending) => {
                if relationship.identity1.id == viewer.id {
                    ViewerStatus::Pending
                } else {
                    ViewerStatus::RequireValidation
                }
            }
            // TODO: give ignored invitations their own viewer status once
            // callers can render it; until then they read as no link.
            Some(RelationshipStatus::Ignore) => ViewerStatus::Alien,
            Some(RelationshipStatus::Confirm) => ViewerStatus::Confirm,
            None => ViewerStatus::Alien,
        }
    }

    /// Get the status name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerStatus::Alien => "alien",
            ViewerStatus::Pending => "pending",
            ViewerStatus::RequireValidation => "require_validation",
            ViewerStatus::Confirm => "confirm",
        }
    }
}

/// One facet of a relationship (e.g. the context an invitation was sent in)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Name of the facet
    pub name: String,

    /// Status of this facet, kept in step with the owning relationship
    pub status: Option<RelationshipStatus>,

    /// Identity that initiated this facet; must be one of the participants
    pub initiator: Identity,
}

impl Property {
    /// Create a property with no status
    pub fn new(name: impl Into<String>, initiator: Identity) -> Self {
        Self {
            name: name.into(),
            status: None,
            initiator,
        }
    }

    /// Set the property status
    pub fn with_status(mut self, status: RelationshipStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A link between two identities
///
/// Undirected in meaning, but `identity1` is the inviter while the
/// relationship is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Record identifier
    pub id: RelationshipId,

    /// First participant (the inviter)
    pub identity1: Identity,

    /// Second participant (the invitee)
    pub identity2: Identity,

    /// Persisted status; unset until the relationship enters the lifecycle
    pub status: Option<RelationshipStatus>,

    /// Ordered facets of the relationship
    pub properties: Vec<Property>,
}

impl Relationship {
    /// Create a relationship between two identities with no status
    pub fn new(identity1: Identity, identity2: Identity) -> Self {
        Self::with_id(RelationshipId::new(), identity1, identity2)
    }

    /// Create a relationship with a known id (used when loading from storage)
    pub fn with_id(id: RelationshipId, identity1: Identity, identity2: Identity) -> Self {
        Self {
            id,
            identity1,
            identity2,
            status: None,
            properties: Vec::new(),
        }
    }

    /// Set the status of the relationship and of every property
    pub fn set_status_cascade(&mut self, status: RelationshipStatus) {
        self.status = Some(status);
        for property in &mut self.properties {
            property.status = Some(status);
        }
    }

    /// Properties currently carrying `status`
    pub fn properties_with_status(
        &self,
        status: RelationshipStatus,
    ) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(move |p| p.status == Some(status))
    }

    /// Whether `id` is one of the two participants
    pub fn involves(&self, id: IdentityId) -> bool {
        self.identity1.id == id || self.identity2.id == id
    }

    /// The participant on the other side from `identity`
    ///
    /// Compared by remote id. When `identity` is not `identity1`, the first
    /// participant is returned.
    pub fn counterpart(&self, identity: &Identity) -> &Identity {
        if self.identity1.remote_id == identity.remote_id {
            &self.identity2
        } else {
            &self.identity1
        }
    }
}
