//! The relationship manager: transitions, queries and lifecycle fan-out

use crate::lifecycle::{LifecycleNotifier, RelationshipEvent, RelationshipListener};
use crate::{validator, ManagerConfig, ManagerError};
use rapport_domain::traits::{IdentityDirectory, RelationshipStore};
use rapport_domain::{
    Identity, IdentityId, Relationship, RelationshipId, RelationshipStatus, ViewerStatus,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Listener type accepted by a [`RelationshipManager`]
pub type ManagerListener<S, D> = dyn RelationshipListener<RelationshipManager<S, D>>;

/// Relationship manager over a store and an identity directory
///
/// Every mutating operation validates the relationship, writes it through the
/// store and then notifies the registered listeners. Store, directory and
/// listener failures are returned to the caller as they happen.
///
/// # Examples
///
/// ```no_run
/// use rapport_domain::Identity;
/// use rapport_manager::RelationshipManager;
/// use rapport_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("rapport.db")?;
/// let directory = SqliteStore::new("rapport.db")?;
/// let mut manager = RelationshipManager::new(store, directory);
///
/// let john = Identity::new("organization", "john");
/// let mary = Identity::new("organization", "mary");
/// let mut invitation = manager.invite(&john, &mary)?;
/// manager.confirm(&mut invitation)?;
/// # Ok(())
/// # }
/// ```
pub struct RelationshipManager<S, D> {
    store: S,
    directory: D,
    config: ManagerConfig,
    lifecycle: LifecycleNotifier<RelationshipManager<S, D>>,
}

impl<S, D> RelationshipManager<S, D>
where
    S: RelationshipStore,
    S::Error: std::error::Error + Send + Sync + 'static,
    D: IdentityDirectory,
    D::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create a manager with default configuration
    pub fn new(store: S, directory: D) -> Self {
        Self::with_config(store, directory, ManagerConfig::default())
    }

    /// Create a manager with the given configuration
    pub fn with_config(store: S, directory: D, config: ManagerConfig) -> Self {
        Self {
            store,
            directory,
            config,
            lifecycle: LifecycleNotifier::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Get the underlying relationship store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the identity directory
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Get a relationship by ID
    pub fn get_by_id(&self, id: RelationshipId) -> Result<Option<Relationship>, ManagerError> {
        self.store.get_relationship(id).map_err(store_error)
    }

    /// Send a connection invitation from `inviter` to `invitee`
    ///
    /// Returns the new pending relationship. Inviting oneself fails with
    /// [`ManagerError::SelfRelationship`] before anything is written.
    pub fn invite(
        &mut self,
        inviter: &Identity,
        invitee: &Identity,
    ) -> Result<Relationship, ManagerError> {
        let mut relationship = self.create(inviter, invitee);
        relationship.status = Some(RelationshipStatus::Pending);

        self.save(&relationship)?;
        self.log_transition(RelationshipEvent::Requested, &relationship);
        self.notify(RelationshipEvent::Requested, &relationship)?;

        Ok(relationship)
    }

    /// Mark a relationship and all of its properties as confirmed
    pub fn confirm(&mut self, relationship: &mut Relationship) -> Result<(), ManagerError> {
        relationship.set_status_cascade(RelationshipStatus::Confirm);

        self.save(relationship)?;
        self.log_transition(RelationshipEvent::Confirmed, relationship);
        self.notify(RelationshipEvent::Confirmed, relationship)
    }

    /// Decline an invitation: the record is deleted
    pub fn deny(&mut self, relationship: &Relationship) -> Result<(), ManagerError> {
        self.store
            .remove_relationship(relationship)
            .map_err(store_error)?;
        self.log_transition(RelationshipEvent::Denied, relationship);
        self.notify(RelationshipEvent::Denied, relationship)
    }

    /// Remove a relationship: the record is deleted
    ///
    /// Same effect on the store as [`deny`](Self::deny); listeners receive a
    /// removal instead of a denial.
    pub fn remove(&mut self, relationship: &Relationship) -> Result<(), ManagerError> {
        self.store
            .remove_relationship(relationship)
            .map_err(store_error)?;
        self.log_transition(RelationshipEvent::Removed, relationship);
        self.notify(RelationshipEvent::Removed, relationship)
    }

    /// Mark a relationship and all of its properties as ignored
    pub fn ignore(&mut self, relationship: &mut Relationship) -> Result<(), ManagerError> {
        relationship.set_status_cascade(RelationshipStatus::Ignore);

        self.save(relationship)?;
        self.log_transition(RelationshipEvent::Ignored, relationship);
        self.notify(RelationshipEvent::Ignored, relationship)
    }

    /// Identities of the configured provider not yet linked to `identity`
    ///
    /// Excludes `identity` itself and every identity with a relationship
    /// record of any status.
    pub fn get_public_relation(&self, identity: &Identity) -> Result<Vec<Identity>, ManagerError> {
        let all = self
            .directory
            .get_identities(&self.config.identity_provider)
            .map_err(|e| ManagerError::Directory(Box::new(e)))?;

        let linked: HashSet<IdentityId> = self
            .get(identity)?
            .unwrap_or_default()
            .iter()
            .flat_map(|rel| [rel.identity1.id, rel.identity2.id])
            .collect();

        Ok(all
            .into_iter()
            .filter(|candidate| candidate.id != identity.id && !linked.contains(&candidate.id))
            .collect())
    }

    /// Every pending relationship of `identity`, sent and received
    ///
    /// A relationship counts when it is pending itself or still has a pending
    /// property.
    pub fn get_pending(&self, identity: &Identity) -> Result<Vec<Relationship>, ManagerError> {
        Ok(self
            .get(identity)?
            .unwrap_or_default()
            .into_iter()
            .filter(|rel| {
                rel.status == Some(RelationshipStatus::Pending)
                    || rel
                        .properties_with_status(RelationshipStatus::Pending)
                        .next()
                        .is_some()
            })
            .collect())
    }

    /// Pending relationships seen from `identity`
    ///
    /// With `to_confirm` the invitations `identity` sent and that wait for the
    /// other side; without it the invitations `identity` received and must
    /// answer.
    pub fn get_pending_for(
        &self,
        identity: &Identity,
        to_confirm: bool,
    ) -> Result<Vec<Relationship>, ManagerError> {
        let wanted = if to_confirm {
            ViewerStatus::Pending
        } else {
            ViewerStatus::RequireValidation
        };

        Ok(self
            .get(identity)?
            .unwrap_or_default()
            .into_iter()
            .filter(|rel| self.get_relationship_status(Some(rel), identity) == wanted)
            .collect())
    }

    /// Pending relationships of `current` whose other side is one of `candidates`
    ///
    /// Candidates are matched by remote id, against the invitee when
    /// `to_confirm` is set and against the inviter otherwise. Only the first
    /// match per candidate is kept.
    pub fn get_pending_among(
        &self,
        current: &Identity,
        candidates: &[Identity],
        to_confirm: bool,
    ) -> Result<Vec<Relationship>, ManagerError> {
        let pending = self.get_pending_for(current, to_confirm)?;

        Ok(first_match_per_candidate(candidates, &pending, |rel| {
            if to_confirm {
                &rel.identity2
            } else {
                &rel.identity1
            }
        }))
    }

    /// Confirmed relationships of `identity` whose other side is one of `candidates`
    ///
    /// Matched by remote id; only the first contact per candidate is kept.
    pub fn get_contacts_among(
        &self,
        identity: &Identity,
        candidates: &[Identity],
    ) -> Result<Vec<Relationship>, ManagerError> {
        let contacts = self.get_contacts(identity)?.unwrap_or_default();

        Ok(first_match_per_candidate(candidates, &contacts, |rel| {
            rel.counterpart(identity)
        }))
    }

    /// Confirmed relationships of `identity`
    ///
    /// `None` when the store does not know the identity.
    pub fn get_contacts(
        &self,
        identity: &Identity,
    ) -> Result<Option<Vec<Relationship>>, ManagerError> {
        Ok(self.get(identity)?.map(|rels| {
            rels.into_iter()
                .filter(|rel| rel.status == Some(RelationshipStatus::Confirm))
                .collect()
        }))
    }

    /// Every relationship `identity` participates in, whatever its status
    ///
    /// `None` when the store does not know the identity.
    pub fn get(&self, identity: &Identity) -> Result<Option<Vec<Relationship>>, ManagerError> {
        self.store
            .get_relationships_by_identity(identity)
            .map_err(store_error)
    }

    /// Same as [`get`](Self::get), keyed by the raw identity identifier
    pub fn get_by_identity_id(&self, id: &str) -> Result<Option<Vec<Relationship>>, ManagerError> {
        self.store
            .get_relationships_by_identity_id(id)
            .map_err(store_error)
    }

    /// Identities on the other side of all of `identity`'s relationships
    ///
    /// Each counterpart appears once, in the order first seen.
    pub fn get_identities(&self, identity: &Identity) -> Result<Vec<Identity>, ManagerError> {
        let mut seen = HashSet::new();
        Ok(self
            .store
            .get_relationship_identities_by_identity(identity)
            .map_err(store_error)?
            .into_iter()
            .filter(|other| seen.insert(other.id))
            .collect())
    }

    /// Build a relationship between two identities without saving it
    pub fn create(&self, identity1: &Identity, identity2: &Identity) -> Relationship {
        Relationship::new(identity1.clone(), identity2.clone())
    }

    /// Path of identities linking `identity1` to `identity2`
    ///
    /// Route finding is not supported; this always returns `None`.
    pub fn find_route(
        &self,
        _identity1: &Identity,
        _identity2: &Identity,
    ) -> Option<Vec<Identity>> {
        None
    }

    /// The relationship between two identities, if any
    pub fn get_relationship(
        &self,
        identity1: &Identity,
        identity2: &Identity,
    ) -> Result<Option<Relationship>, ManagerError> {
        Ok(self
            .get(identity1)?
            .unwrap_or_default()
            .into_iter()
            .find(|rel| rel.involves(identity2.id)))
    }

    /// Status of `relationship` from the point of view of `viewer`
    ///
    /// Ignored relationships read as [`ViewerStatus::Alien`].
    pub fn get_relationship_status(
        &self,
        relationship: Option<&Relationship>,
        viewer: &Identity,
    ) -> ViewerStatus {
        ViewerStatus::resolve(relationship, viewer)
    }

    /// Register a lifecycle listener
    ///
    /// Registering the same instance twice has no effect.
    pub fn register_listener(&mut self, listener: Arc<ManagerListener<S, D>>) {
        self.lifecycle.add_listener(listener);
    }

    /// Unregister a lifecycle listener instance
    pub fn unregister_listener(&mut self, listener: &Arc<ManagerListener<S, D>>) {
        self.lifecycle.remove_listener(listener);
    }

    /// Register a listener the manager takes ownership of
    pub fn add_listener_plugin<P>(&mut self, plugin: P)
    where
        P: RelationshipListener<Self> + 'static,
    {
        self.register_listener(Arc::new(plugin));
    }

    /// Names of the registered listeners, in notification order
    pub fn listener_names(&self) -> Vec<String> {
        self.lifecycle.listener_names()
    }

    /// Validate then write a relationship
    fn save(&mut self, relationship: &Relationship) -> Result<(), ManagerError> {
        if let Err(e) = validator::validate(relationship) {
            warn!("Rejected relationship {}: {}", relationship.id, e);
            return Err(e);
        }

        self.store
            .save_relationship(relationship)
            .map_err(store_error)
    }

    fn notify(
        &self,
        event: RelationshipEvent,
        relationship: &Relationship,
    ) -> Result<(), ManagerError> {
        self.lifecycle.notify(event, self, relationship)?;
        Ok(())
    }

    fn log_transition(&self, event: RelationshipEvent, relationship: &Relationship) {
        if self.config.log_transitions {
            info!(
                relationship = %relationship.id,
                identity1 = %relationship.identity1,
                identity2 = %relationship.identity2,
                "Relationship {}",
                event
            );
        } else {
            debug!(relationship = %relationship.id, "Relationship {}", event);
        }
    }
}

fn store_error<E>(e: E) -> ManagerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ManagerError::Store(Box::new(e))
}

/// For each candidate, the first relationship whose selected side has the
/// candidate's remote id
fn first_match_per_candidate<'a, F>(
    candidates: &[Identity],
    relationships: &'a [Relationship],
    side: F,
) -> Vec<Relationship>
where
    F: Fn(&'a Relationship) -> &'a Identity,
{
    candidates
        .iter()
        .filter_map(|candidate| {
            relationships
                .iter()
                .find(|rel| side(rel).remote_id == candidate.remote_id)
                .cloned()
        })
        .collect()
}
