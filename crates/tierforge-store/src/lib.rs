//! TierForge Storage Layer
//!
//! SQLite-backed persistence for profiles, categories, parameters, products
//! and tier lists. Implements the domain collaborator traits
//! ([`ProductCatalog`], [`TierListStore`], [`UsageSource`]).
//!
//! # Architecture
//!
//! - Relational tables for catalog records and tier lists
//! - Tier documents and parameter values stored as JSON text
//! - Plan limits enforced before every create
//! - Likes and views are server-side counters updated atomically
//!
//! # Examples
//!
//! ```no_run
//! use tierforge_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for catalog and tier list operations
//! ```
//!
//! [`ProductCatalog`]: tierforge_domain::traits::ProductCatalog
//! [`TierListStore`]: tierforge_domain::traits::TierListStore
//! [`UsageSource`]: tierforge_domain::traits::UsageSource

#![warn(missing_docs)]

mod catalog;
mod profiles;
mod tier_lists;

pub use catalog::{NewProduct, ParameterUpdate, ProductUpdate};
pub use tier_lists::NewTierList;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tierforge_domain::traits::UsageSource;
use tierforge_domain::{DomainError, LimitExceeded, ParameterError, RecordId, Resource};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unique constraint hit
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Plan does not allow creating another record
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceeded),

    /// Caller does not own the record
    #[error("Operation not permitted: {0}")]
    Forbidden(String),

    /// Parameter definition or value rejected
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Domain rule violated
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// SQLite-based TierForge store
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
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
    /// use tierforge_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("tierforge.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        register_functions(&conn)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!(path = %path.as_ref().display(), "Opened store");
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Refuse creation of `resource` when `owner`'s plan is exhausted
    fn enforce_limit(&self, owner: RecordId, resource: Resource) -> Result<(), StoreError> {
        let usage = self.usage(owner)?;
        let limits = self.subscription(owner)?.limits();
        limits.check(&usage, resource).map_err(|e| {
            tracing::info!(owner = %owner, resource = %resource, limit = e.limit, "Plan limit reached");
            StoreError::from(e)
        })
    }
}

/// SQLite's `lower()` only folds ASCII; `casefold()` folds any script.
fn register_functions(conn: &Connection) -> Result<(), StoreError> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Convert RecordId to bytes for storage
pub(crate) fn id_to_bytes(id: RecordId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

/// Convert bytes to RecordId
pub(crate) fn bytes_to_id(bytes: &[u8]) -> Result<RecordId, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for RecordId, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(RecordId::from_value(u128::from_be_bytes(arr)))
}

/// Read a RecordId column inside a row mapper
pub(crate) fn row_id(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<RecordId> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes_to_id(&bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
    })
}

/// Read a non-negative integer column inside a row mapper
pub(crate) fn row_u64(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

/// Wrap a decoding failure inside a row mapper
pub(crate) fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Map a unique-constraint failure to [`StoreError::Duplicate`]
pub(crate) fn map_unique(err: rusqlite::Error, what: impl Into<String>) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Duplicate(what.into())
        }
        _ => StoreError::Database(err),
    }
}

/// Current time in milliseconds since the Unix epoch
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
