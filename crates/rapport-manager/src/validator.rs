//! Relationship validation, run before every write

use crate::ManagerError;
use rapport_domain::Relationship;

/// Check the relationship invariants
///
/// - the two participants must be different identities
/// - every property must be initiated by one of the participants
pub fn validate(relationship: &Relationship) -> Result<(), ManagerError> {
    if relationship.identity1.id == relationship.identity2.id {
        return Err(ManagerError::SelfRelationship(relationship.identity1.id));
    }

    for property in &relationship.properties {
        if !relationship.involves(property.initiator.id) {
            return Err(ManagerError::NonMemberInitiator {
                relationship: relationship.id,
                property: property.name.clone(),
                initiator: property.initiator.id,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_domain::{Identity, Property};

    fn create_test_relationship() -> Relationship {
        Relationship::new(
            Identity::new("organization", "john"),
            Identity::new("organization", "mary"),
        )
    }

    #[test]
    fn test_valid_relationship() {
        let mut rel = create_test_relationship();
        let john = rel.identity1.clone();
        let mary = rel.identity2.clone();
        rel.properties.push(Property::new("colleague", john));
        rel.properties.push(Property::new("family", mary));

        assert!(validate(&rel).is_ok());
    }

    #[test]
    fn test_self_relationship() {
        let john = Identity::new("organization", "john");
        let rel = Relationship::new(john.clone(), john.clone());

        match validate(&rel) {
            Err(ManagerError::SelfRelationship(id)) => assert_eq!(id, john.id),
            other => panic!("Expected SelfRelationship, got {:?}", other),
        }
    }

    #[test]
    fn test_self_relationship_compares_ids_only() {
        // Same id under a different remote id is still the same identity
        let john = Identity::new("organization", "john");
        let alias = Identity::with_id(john.id, "organization", "johnny");
        let rel = Relationship::new(john, alias);

        assert!(matches!(validate(&rel), Err(ManagerError::SelfRelationship(_))));
    }

    #[test]
    fn test_non_member_initiator() {
        let mut rel = create_test_relationship();
        let outsider = Identity::new("organization", "paul");
        rel.properties.push(Property::new("colleague", rel.identity1.clone()));
        rel.properties.push(Property::new("gossip", outsider.clone()));

        match validate(&rel) {
            Err(ManagerError::NonMemberInitiator {
                property, initiator, ..
            }) => {
                assert_eq!(property, "gossip");
                assert_eq!(initiator, outsider.id);
            }
            other => panic!("Expected NonMemberInitiator, got {:?}", other),
        }
    }

    #[test]
    fn test_self_relationship_checked_first() {
        let john = Identity::new("organization", "john");
        let mut rel = Relationship::new(john.clone(), john);
        rel.properties
            .push(Property::new("gossip", Identity::new("organization", "paul")));

        let err = validate(&rel).unwrap_err();
        assert!(matches!(err, ManagerError::SelfRelationship(_)));
        assert!(err.is_validation());
    }
}
