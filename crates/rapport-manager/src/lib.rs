//! Rapport Relationship Manager
//!
//! Drives the relationship lifecycle between identities.
//!
//! The manager provides:
//! - Invitation, confirmation, denial, removal and ignoring of relationships
//! - Queries over contacts, pending invitations and public relations
//! - Validation of every relationship before it is written
//! - Synchronous lifecycle notification to registered listeners
//!
//! # Examples
//!
//! ```no_run
//! use rapport_domain::Identity;
//! use rapport_manager::{ManagerConfig, RelationshipManager, RelationshipMetrics};
//! use rapport_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ManagerConfig::default();
//! let mut manager = RelationshipManager::with_config(
//!     SqliteStore::new("rapport.db")?,
//!     SqliteStore::new("rapport.db")?,
//!     config,
//! );
//! manager.add_listener_plugin(RelationshipMetrics::new());
//!
//! let john = Identity::new("organization", "john");
//! let mary = Identity::new("organization", "mary");
//! let invitation = manager.invite(&john, &mary)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod lifecycle;
mod manager;
mod metrics;
mod validator;

pub use config::{ConfigError, ManagerConfig, DEFAULT_IDENTITY_PROVIDER};
pub use error::{BoxError, ListenerError, ManagerError};
pub use lifecycle::{LifecycleNotifier, RelationshipEvent, RelationshipListener};
pub use manager::{ManagerListener, RelationshipManager};
pub use metrics::RelationshipMetrics;
pub use validator::validate;
