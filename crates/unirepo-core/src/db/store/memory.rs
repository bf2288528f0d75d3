use crate::{
    db::store::{Row, Store, StoreError, StoreModel},
    key::StorageKey,
    value::Value,
};
use std::collections::{BTreeMap, HashMap};

type Collection = BTreeMap<StorageKey, Row>;

///
/// MemoryStore
///
/// In-process store: one ordered map per entity path plus a queue of
/// staged operations. A commit touches only the rows in the batch.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Collection>,
    staged: Vec<StagedOp>,
    primary_keys: HashMap<String, Vec<String>>,
}

#[derive(Debug)]
enum StagedOp {
    Add {
        entity: String,
        key: StorageKey,
        row: Row,
    },
    Replace {
        entity: String,
        key: StorageKey,
        row: Row,
    },
    Patch {
        entity: String,
        key: StorageKey,
        changes: Vec<(String, Value)>,
    },
    Remove {
        entity: String,
        key: StorageKey,
    },
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the primary key the store's model reports for `entity_path`.
    #[must_use]
    pub fn with_primary_key(mut self, entity_path: &str, fields: &[&str]) -> Self {
        self.primary_keys.insert(
            entity_path.to_string(),
            fields.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Committed row count for an entity path.
    #[must_use]
    pub fn len(&self, entity: &str) -> usize {
        self.collections.get(entity).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.values().all(BTreeMap::is_empty)
    }
}

impl StoreModel for MemoryStore {
    fn find_primary_key(&self, entity_path: &str) -> Option<Vec<String>> {
        self.primary_keys.get(entity_path).cloned()
    }
}

impl Store for MemoryStore {
    fn find(&self, entity: &str, key: &StorageKey) -> Result<Option<Row>, StoreError> {
        Ok(self
            .collections
            .get(entity)
            .and_then(|rows| rows.get(key))
            .cloned())
    }

    fn scan(&self, entity: &str) -> Result<Vec<(StorageKey, Row)>, StoreError> {
        Ok(self
            .collections
            .get(entity)
            .map(|rows| {
                rows.iter()
                    .map(|(k, row)| (k.clone(), row.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add(&mut self, entity: &str, key: StorageKey, row: Row) {
        self.staged.push(StagedOp::Add {
            entity: entity.to_string(),
            key,
            row,
        });
    }

    fn replace(&mut self, entity: &str, key: StorageKey, row: Row) {
        self.staged.push(StagedOp::Replace {
            entity: entity.to_string(),
            key,
            row,
        });
    }

    fn patch(&mut self, entity: &str, key: StorageKey, changes: Vec<(String, Value)>) {
        self.staged.push(StagedOp::Patch {
            entity: entity.to_string(),
            key,
            changes,
        });
    }

    fn remove(&mut self, entity: &str, key: StorageKey) {
        self.staged.push(StagedOp::Remove {
            entity: entity.to_string(),
            key,
        });
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    fn save_changes(&mut self) -> Result<usize, StoreError> {
        let staged = std::mem::take(&mut self.staged);
        let applied = staged.len();

        // apply in place; on failure replay the undo log backwards
        let mut undo = Vec::with_capacity(applied);
        for op in staged {
            if let Err(err) = apply(&mut self.collections, op, &mut undo) {
                rollback(&mut self.collections, undo);
                return Err(err);
            }
        }

        Ok(applied)
    }

    fn discard_changes(&mut self) {
        self.staged.clear();
    }
}

///
/// Undo
///
/// Prior state of one row touched by a batch; `None` means it was absent.
///

struct Undo {
    entity: String,
    key: StorageKey,
    prior: Option<Row>,
}

fn apply(
    collections: &mut HashMap<String, Collection>,
    op: StagedOp,
    undo: &mut Vec<Undo>,
) -> Result<(), StoreError> {
    match op {
        StagedOp::Add { entity, key, row } => {
            let rows = collections.entry(entity.clone()).or_default();
            if rows.contains_key(&key) {
                return Err(StoreError::conflict(&entity, &key));
            }
            rows.insert(key.clone(), row);
            undo.push(Undo {
                entity,
                key,
                prior: None,
            });
        }
        StagedOp::Replace { entity, key, row } => {
            let slot = existing(collections, &entity, &key)?;
            let prior = std::mem::replace(slot, row);
            undo.push(Undo {
                entity,
                key,
                prior: Some(prior),
            });
        }
        StagedOp::Patch {
            entity,
            key,
            changes,
        } => {
            let slot = existing(collections, &entity, &key)?;
            let prior = slot.clone();
            slot.apply(changes);
            undo.push(Undo {
                entity,
                key,
                prior: Some(prior),
            });
        }
        StagedOp::Remove { entity, key } => {
            let prior = collections
                .get_mut(&entity)
                .and_then(|rows| rows.remove(&key))
                .ok_or_else(|| StoreError::missing(&entity, &key))?;
            undo.push(Undo {
                entity,
                key,
                prior: Some(prior),
            });
        }
    }

    Ok(())
}

fn rollback(collections: &mut HashMap<String, Collection>, undo: Vec<Undo>) {
    for Undo { entity, key, prior } in undo.into_iter().rev() {
        let rows = collections.entry(entity).or_default();
        match prior {
            Some(row) => {
                rows.insert(key, row);
            }
            None => {
                rows.remove(&key);
            }
        }
    }
}

fn existing<'a>(
    collections: &'a mut HashMap<String, Collection>,
    entity: &str,
    key: &StorageKey,
) -> Result<&'a mut Row, StoreError> {
    collections
        .get_mut(entity)
        .and_then(|rows| rows.get_mut(key))
        .ok_or_else(|| StoreError::missing(entity, key))
}
