//! Command implementations.

pub mod config;
pub mod identity;
pub mod list;
pub mod relationship;

pub use self::config::execute_config;
pub use self::identity::execute_identity;
pub use self::list::{execute_list, execute_status, execute_suggest};
pub use self::relationship::{execute_invite, execute_transition, Transition};

use crate::error::{CliError, Result};
use rapport_domain::{Identity, Relationship, RelationshipId};
use rapport_manager::{ManagerConfig, RelationshipManager};
use rapport_store::SqliteStore;
use std::fs;
use std::path::Path;

/// Manager over a SQLite file, which also serves as the identity directory.
pub type Manager = RelationshipManager<SqliteStore, SqliteStore>;

/// Open the database, creating its directory if needed.
pub fn open_store(database: &Path) -> Result<SqliteStore> {
    if let Some(parent) = database.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(SqliteStore::new(database)?)
}

/// Open a manager on the database.
pub fn open_manager(database: &Path, config: ManagerConfig) -> Result<Manager> {
    let store = open_store(database)?;
    let directory = open_store(database)?;
    Ok(RelationshipManager::with_config(store, directory, config))
}

/// Find a registered identity of the configured provider.
pub fn resolve_identity(manager: &Manager, remote_id: &str) -> Result<Identity> {
    let provider = &manager.config().identity_provider;
    manager
        .store()
        .find_identity_by_remote_id(provider, remote_id)?
        .ok_or_else(|| CliError::UnknownIdentity(format!("{}:{}", provider, remote_id)))
}

/// Fetch a relationship by its textual id.
pub fn load_relationship(manager: &Manager, id: &str) -> Result<Relationship> {
    let id = RelationshipId::from_string(id)
        .map_err(|e| CliError::InvalidInput(format!("Invalid relationship ID '{}': {}", id, e)))?;

    manager
        .get_by_id(id)?
        .ok_or_else(|| CliError::RelationshipNotFound(id.to_string()))
}
