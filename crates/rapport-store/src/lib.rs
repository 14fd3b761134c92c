//! Rapport Storage Layer
//!
//! Implements the `RelationshipStore` and `IdentityDirectory` traits on SQLite.
//!
//! # Architecture
//!
//! - `identities`: every identity a relationship or the directory refers to
//! - `relationships`: one row per link, status stored by name
//! - `relationship_properties`: ordered facets of each relationship
//!
//! The [`cache`] module holds the loader used by the future cache in front of
//! this store.
//!
//! # Examples
//!
//! ```no_run
//! use rapport_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for relationship operations
//! ```

#![warn(missing_docs)]

pub mod cache;

use rapport_domain::traits::{IdentityDirectory, RelationshipStore};
use rapport_domain::{
    Identity, IdentityId, Property, Relationship, RelationshipId, RelationshipStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const RELATIONSHIP_COLUMNS: &str =
    "SELECT r.id, r.status,
            i1.id, i1.provider_id, i1.remote_id,
            i2.id, i2.provider_id, i2.remote_id
     FROM relationships r
     JOIN identities i1 ON i1.id = r.identity1_id
     JOIN identities i2 ON i2.id = r.identity2_id";

/// SQLite-based implementation of `RelationshipStore` and `IdentityDirectory`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rapport_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("rapport.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Register an identity, updating its provider and remote id if it exists
    pub fn save_identity(&mut self, identity: &Identity) -> Result<(), StoreError> {
        upsert_identity(&self.conn, identity)?;
        Ok(())
    }

    /// Get an identity by ID
    pub fn find_identity(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        let identity = self
            .conn
            .query_row(
                "SELECT id, provider_id, remote_id FROM identities WHERE id = ?1",
                params![id.to_string()],
                |row| identity_from_row(row, 0),
            )
            .optional()?;

        Ok(identity)
    }

    /// Get an identity by its provider-scoped remote id
    pub fn find_identity_by_remote_id(
        &self,
        provider_id: &str,
        remote_id: &str,
    ) -> Result<Option<Identity>, StoreError> {
        let identity = self
            .conn
            .query_row(
                "SELECT id, provider_id, remote_id FROM identities
                 WHERE provider_id = ?1 AND remote_id = ?2",
                params![provider_id, remote_id],
                |row| identity_from_row(row, 0),
            )
            .optional()?;

        Ok(identity)
    }

    /// Get every registered identity, across providers, in registration order
    pub fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, provider_id, remote_id FROM identities ORDER BY rowid")?;

        let identities = stmt
            .query_map([], |row| identity_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(identities)
    }

    fn identity_exists(&self, id: &str) -> Result<bool, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM identities WHERE id = ?1",
                params![id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }

    /// Run a relationship query and attach the properties of every row
    fn query_relationships(
        &self,
        filter: &str,
        param: &str,
    ) -> Result<Vec<Relationship>, StoreError> {
        let sql = format!("{} {} ORDER BY r.rowid", RELATIONSHIP_COLUMNS, filter);
        let mut stmt = self.conn.prepare(&sql)?;

        let mut relationships = stmt
            .query_map(params![param], relationship_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for relationship in &mut relationships {
            relationship.properties = self.load_properties(relationship.id)?;
        }

        Ok(relationships)
    }

    fn load_properties(&self, id: RelationshipId) -> Result<Vec<Property>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, p.status, i.id, i.provider_id, i.remote_id
             FROM relationship_properties p
             JOIN identities i ON i.id = p.initiator_id
             WHERE p.relationship_id = ?1
             ORDER BY p.position",
        )?;

        let properties = stmt
            .query_map(params![id.to_string()], |row| {
                let status: Option<String> = row.get(1)?;
                Ok(Property {
                    name: row.get(0)?,
                    status: status.map(|s| parse_status(&s, 1)).transpose()?,
                    initiator: identity_from_row(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(properties)
    }
}

impl RelationshipStore for SqliteStore {
    type Error = StoreError;

    fn get_relationship(&self, id: RelationshipId) -> Result<Option<Relationship>, Self::Error> {
        let relationship = self
            .query_relationships("WHERE r.id = ?1", &id.to_string())?
            .into_iter()
            .next();

        Ok(relationship)
    }

    fn get_relationships_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Vec<Relationship>>, Self::Error> {
        self.get_relationships_by_identity_id(&identity.id.to_string())
    }

    fn get_relationships_by_identity_id(
        &self,
        id: &str,
    ) -> Result<Option<Vec<Relationship>>, Self::Error> {
        if !self.identity_exists(id)? {
            return Ok(None);
        }

        let relationships =
            self.query_relationships("WHERE r.identity1_id = ?1 OR r.identity2_id = ?1", id)?;

        Ok(Some(relationships))
    }

    fn get_relationship_identities_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Identity>, Self::Error> {
        let relationships = self
            .get_relationships_by_identity(identity)?
            .unwrap_or_default();

        let identities = relationships
            .into_iter()
            .map(|rel| {
                if rel.identity1.id == identity.id {
                    rel.identity2
                } else {
                    rel.identity1
                }
            })
            .collect();

        Ok(identities)
    }

    fn save_relationship(&mut self, relationship: &Relationship) -> Result<(), Self::Error> {
        let id = relationship.id.to_string();
        let tx = self.conn.transaction()?;

        upsert_identity(&tx, &relationship.identity1)?;
        upsert_identity(&tx, &relationship.identity2)?;
        for property in &relationship.properties {
            upsert_identity(&tx, &property.initiator)?;
        }

        tx.execute(
            "INSERT INTO relationships (id, identity1_id, identity2_id, status)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
             identity1_id = excluded.identity1_id,
             identity2_id = excluded.identity2_id,
             status = excluded.status",
            params![
                &id,
                relationship.identity1.id.to_string(),
                relationship.identity2.id.to_string(),
                relationship.status.map(|s| s.as_str()),
            ],
        )?;

        tx.execute(
            "DELETE FROM relationship_properties WHERE relationship_id = ?1",
            params![&id],
        )?;

        for (position, property) in relationship.properties.iter().enumerate() {
            tx.execute(
                "INSERT INTO relationship_properties
                     (relationship_id, position, name, status, initiator_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &id,
                    position as i64,
                    &property.name,
                    property.status.map(|s| s.as_str()),
                    property.initiator.id.to_string(),
                ],
            )?;
        }

        tx.commit()?;
        debug!(
            relationship = %id,
            properties = relationship.properties.len(),
            "Relationship saved"
        );

        Ok(())
    }

    fn remove_relationship(&mut self, relationship: &Relationship) -> Result<(), Self::Error> {
        let id = relationship.id.to_string();

        // Properties go with the row (ON DELETE CASCADE)
        let deleted = self
            .conn
            .execute("DELETE FROM relationships WHERE id = ?1", params![&id])?;

        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(relationship = %id, "Relationship removed");
        Ok(())
    }
}

impl IdentityDirectory for SqliteStore {
    type Error = StoreError;

    fn get_identities(&self, provider_id: &str) -> Result<Vec<Identity>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, provider_id, remote_id FROM identities
             WHERE provider_id = ?1 ORDER BY rowid",
        )?;

        let identities = stmt
            .query_map(params![provider_id], |row| identity_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(identities)
    }
}

/// Insert or update an identity
///
/// Another identity already holding the same provider and remote id is
/// reported as `InvalidData`.
fn upsert_identity(conn: &Connection, identity: &Identity) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO identities (id, provider_id, remote_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
         provider_id = excluded.provider_id, remote_id = excluded.remote_id",
        params![identity.id.to_string(), &identity.provider_id, &identity.remote_id],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::InvalidData(format!(
                "remote id '{}' already registered under provider '{}' by another identity",
                identity.remote_id, identity.provider_id
            ))
        }
        other => StoreError::Database(other),
    })?;
    Ok(())
}

/// Read an identity from three consecutive columns starting at `start`
fn identity_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<Identity> {
    let id: String = row.get(start)?;
    let id = IdentityId::from_string(&id)
        .map_err(|e| conversion_error(start, StoreError::InvalidData(e)))?;

    Ok(Identity::with_id(id, row.get::<_, String>(start + 1)?, row.get::<_, String>(start + 2)?))
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    let id: String = row.get(0)?;
    let id = RelationshipId::from_string(&id)
        .map_err(|e| conversion_error(0, StoreError::InvalidData(e)))?;
    let status: Option<String> = row.get(1)?;

    let mut relationship =
        Relationship::with_id(id, identity_from_row(row, 2)?, identity_from_row(row, 5)?);
    relationship.status = status.map(|s| parse_status(&s, 1)).transpose()?;

    Ok(relationship)
}

fn parse_status(value: &str, column: usize) -> rusqlite::Result<RelationshipStatus> {
    RelationshipStatus::parse(value).ok_or_else(|| {
        conversion_error(
            column,
            StoreError::InvalidData(format!("Unknown relationship status: {}", value)),
        )
    })
}

fn conversion_error(column: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}
