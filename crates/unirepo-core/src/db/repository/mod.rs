mod delete;
mod load;
mod query;
mod save;

use crate::{
    db::{
        Loaded, ReadMode, Session,
        predicate::KeyPredicate,
        store::{Row, Store},
    },
    error::RepoError,
    key::{IdValue, KeyDescriptor, StorageKey},
    obs::sink::{ExecKind, Span},
    traits::EntityKind,
    value::Value,
};
use std::{marker::PhantomData, sync::Arc};

///
/// UniversalRepository
///
/// CRUD and query surface for any `EntityKind`, with no per-entity code.
/// Borrowed from a `Session`; every call resolves the entity's key through
/// the session's metadata cache and goes to the session's store.
///

pub struct UniversalRepository<'a, E: EntityKind, S: Store> {
    session: &'a Session<S>,
    _marker: PhantomData<E>,
}

impl<'a, E: EntityKind, S: Store> UniversalRepository<'a, E, S> {
    pub(crate) const fn new(session: &'a Session<S>) -> Self {
        Self {
            session,
            _marker: PhantomData,
        }
    }

    /// The resolved key shape of `E`.
    pub fn descriptor(&self) -> Result<Arc<KeyDescriptor>, RepoError> {
        self.session.with_metrics(|| self.session.resolve::<E>())
    }

    // ---------------------------------------------------------------------
    // Shared helpers
    // ---------------------------------------------------------------------

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.session.config().debug {
            tracing::debug!(entity = E::PATH, "{}", s.as_ref());
        }
    }

    fn span(&self, kind: ExecKind) -> Span {
        Span::new(kind, E::PATH, self.session.config().metrics)
    }

    fn entity_name() -> &'static str {
        E::MODEL.entity_name
    }

    // Decode a stored row and wrap it per read mode.
    fn materialize(key: StorageKey, row: Row, mode: ReadMode) -> Result<Loaded<E>, RepoError> {
        let entity = row.to_entity::<E>()?;

        Ok(match mode {
            ReadMode::Tracked => Loaded::tracked(entity, key, row),
            ReadMode::Readonly => Loaded::detached(entity, key),
        })
    }

    // Look a row up by caller-supplied id. A single value takes the
    // single-key fast path; a sequence always goes through the key
    // predicate. Returns the bound key even when nothing matched.
    fn fetch(&self, id: &IdValue) -> Result<(StorageKey, Option<Row>), RepoError> {
        let desc = self.session.resolve::<E>()?;

        match id {
            IdValue::Single(value) => {
                if value.is_null() {
                    return Err(RepoError::NullArgument { argument: "id" });
                }
                let key = desc.convert_single(value)?;
                let row = self.session.store().find(E::PATH, &key)?;

                Ok((key, row))
            }
            IdValue::Composite(keys) => {
                if let Some(pos) = keys.iter().position(Value::is_null) {
                    return Err(RepoError::invalid_argument(
                        "keys",
                        format!("key value at position {pos} is null"),
                    ));
                }
                let predicate = KeyPredicate::build(keys, &desc)?;
                let key = desc.bind(keys)?;
                let row = self
                    .session
                    .store()
                    .filter(E::PATH, &predicate)?
                    .into_iter()
                    .next()
                    .map(|(_, row)| row);

                Ok((key, row))
            }
        }
    }

    // Commit staged writes; the store drops the batch on failure.
    fn commit(&self, store: &mut S) -> Result<usize, RepoError> {
        let applied = store.save_changes()?;
        self.debug_log(format!("committed {applied} staged operation(s)"));

        Ok(applied)
    }
}
