mod memory;
mod row;

pub use memory::MemoryStore;
pub use row::Row;

use crate::{
    db::predicate::Predicate, error::ErrorClass, key::StorageKey, value::Value,
};
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures raised by a store implementation. The repository propagates
/// them unchanged and never retries.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("{entity} with key {key} already exists")]
    Conflict { entity: String, key: String },

    #[error("{entity} with key {key} does not exist")]
    Missing { entity: String, key: String },

    #[error("store backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub(crate) fn conflict(entity: &str, key: &StorageKey) -> Self {
        Self::Conflict {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn missing(entity: &str, key: &StorageKey) -> Self {
        Self::Missing {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Conflict { .. } => ErrorClass::Conflict,
            Self::Missing { .. } => ErrorClass::NotFound,
            Self::Backend { .. } => ErrorClass::Internal,
        }
    }
}

///
/// StoreModel
///
/// Model introspection: the key a store declares for an entity path, in
/// key order. Consulted only for entities that do not declare their own.
///

pub trait StoreModel {
    fn find_primary_key(&self, entity_path: &str) -> Option<Vec<String>>;
}

///
/// Store
///
/// Opaque keyed collection of rows per entity path.
///
/// Reads see committed state. Writes are staged and only become visible
/// after `save_changes`, which applies the whole batch or none of it. A
/// failed save drops the batch.
///

pub trait Store: StoreModel {
    fn find(&self, entity: &str, key: &StorageKey) -> Result<Option<Row>, StoreError>;

    /// Every row of `entity`, in key order.
    fn scan(&self, entity: &str) -> Result<Vec<(StorageKey, Row)>, StoreError>;

    /// Rows of `entity` matching `predicate`.
    fn filter(
        &self,
        entity: &str,
        predicate: &Predicate,
    ) -> Result<Vec<(StorageKey, Row)>, StoreError> {
        let mut rows = self.scan(entity)?;
        rows.retain(|(_, row)| predicate.matches(row));

        Ok(rows)
    }

    // staged writes
    fn add(&mut self, entity: &str, key: StorageKey, row: Row);
    fn replace(&mut self, entity: &str, key: StorageKey, row: Row);
    fn patch(&mut self, entity: &str, key: StorageKey, changes: Vec<(String, Value)>);
    fn remove(&mut self, entity: &str, key: StorageKey);

    /// Number of staged operations.
    fn pending(&self) -> usize;

    /// Commit every staged operation; returns how many were applied.
    fn save_changes(&mut self) -> Result<usize, StoreError>;

    fn discard_changes(&mut self);
}
