//! Identity module - the participants of a relationship

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an identity based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability, so identities list in registration order
/// - 128-bit uniqueness without coordination between providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityId(u128);

impl IdentityId {
    /// Generate a new UUIDv7-based IdentityId
    ///
    /// # Examples
    ///
    /// ```
    /// use rapport_domain::IdentityId;
    ///
    /// let id = IdentityId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an IdentityId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an IdentityId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use rapport_domain::IdentityId;
    ///
    /// let id = IdentityId::new();
    /// let parsed = IdentityId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid identity id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl FromStr for IdentityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// A user or profile known to an identity provider
///
/// `remote_id` is only unique within `provider_id` (e.g. the user name
/// inside the "organization" provider); `id` is unique across providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Stable unique identifier
    pub id: IdentityId,

    /// Name of the provider that owns this identity
    pub provider_id: String,

    /// Provider-scoped identifier
    pub remote_id: String,
}

impl Identity {
    /// Create a new identity with a freshly generated id
    pub fn new(provider_id: impl Into<String>, remote_id: impl Into<String>) -> Self {
        Self::with_id(IdentityId::new(), provider_id, remote_id)
    }

    /// Create an identity with a known id (used when loading from storage)
    pub fn with_id(
        id: IdentityId,
        provider_id: impl Into<String>,
        remote_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            provider_id: provider_id.into(),
            remote_id: remote_id.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_id, self.remote_id)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: IdentityId ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = IdentityId::from_value(a);
            let id_b = IdentityId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: Round-trip through string representation preserves ID
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = IdentityId::from_value(value);

            match IdentityId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
