//! Loader used by the future cache in front of the store
//!
//! The future cache owns caching and eviction. On a miss it hands a
//! [`ServiceContext`] (the computation that produces the value) and the key to
//! a [`Loader`]; [`CacheLoader`] simply executes the computation.

use rapport_domain::{IdentityId, RelationshipId};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

/// Marker for types usable as future cache keys
pub trait CacheKey: Clone + Eq + Hash + Debug {}

impl CacheKey for IdentityId {}
impl CacheKey for RelationshipId {}
impl CacheKey for String {}

/// A deferred computation producing a cacheable value
pub trait ServiceContext<V> {
    /// Error raised by the computation
    type Error;

    /// Run the computation
    fn execute(self) -> Result<V, Self::Error>;
}

impl<V, E, F> ServiceContext<V> for F
where
    F: FnOnce() -> Result<V, E>,
{
    type Error = E;

    fn execute(self) -> Result<V, E> {
        self()
    }
}

/// Interface the future cache calls when it has no value for a key
pub trait Loader<K, V, C> {
    /// Error raised while loading
    type Error;

    /// Materialize the value for `key` from `context`
    fn retrieve(&self, context: C, key: &K) -> Result<V, Self::Error>;
}

/// Loader that executes the service context it is given
#[derive(Debug)]
pub struct CacheLoader<K, V> {
    _marker: PhantomData<fn(&K) -> V>,
}

impl<K, V> CacheLoader<K, V> {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for CacheLoader<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for CacheLoader<K, V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K, V, C> Loader<K, V, C> for CacheLoader<K, V>
where
    K: CacheKey,
    C: ServiceContext<V>,
{
    type Error = C::Error;

    fn retrieve(&self, context: C, _key: &K) -> Result<V, Self::Error> {
        context.execute()
    }
}
