use crate::{
    db::{Loaded, Query, ReadMode, repository::UniversalRepository, store::Store},
    error::RepoError,
    key::IdValue,
    obs::sink::ExecKind,
    traits::EntityKind,
    value::Value,
};

impl<E: EntityKind, S: Store> UniversalRepository<'_, E, S> {
    /// Every stored `E`, tracked or detached per `mode`.
    ///
    /// The store is read once, here; the returned query composes lazily
    /// over that snapshot.
    pub fn get_all(&self, mode: ReadMode) -> Result<Query<'static, Loaded<E>>, RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Load);
            let rows = self.session.store().scan(E::PATH)?;

            let loaded = rows
                .into_iter()
                .map(|(key, row)| Self::materialize(key, row, mode))
                .collect::<Result<Vec<_>, _>>()?;

            span.set_rows(loaded.len() as u64);
            self.debug_log(format!("get_all ({mode:?}): {} row(s)", loaded.len()));

            Ok(Query::from_vec(loaded))
        })
    }

    /// `get_all` in the session's default read mode.
    pub fn all(&self) -> Result<Query<'static, Loaded<E>>, RepoError> {
        self.get_all(self.session.config().default_read_mode)
    }

    /// Fetch by id. A sequence id (or a `Value::List`) is always treated
    /// as a composite key. Absent rows are `Ok(None)`.
    pub fn get_by_id(
        &self,
        id: impl Into<IdValue>,
        mode: ReadMode,
    ) -> Result<Option<Loaded<E>>, RepoError> {
        let id = id.into();
        if id.is_null() {
            return Err(RepoError::NullArgument { argument: "id" });
        }

        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Load);
            let (key, row) = self.fetch(&id)?;

            self.debug_log(format!(
                "get_by_id {key} ({mode:?}): {}",
                if row.is_some() { "hit" } else { "miss" }
            ));

            row.map(|row| {
                span.set_rows(1);
                Self::materialize(key, row, mode)
            })
            .transpose()
        })
    }

    /// `get_by_id` in the session's default read mode.
    pub fn get(&self, id: impl Into<IdValue>) -> Result<Option<Loaded<E>>, RepoError> {
        self.get_by_id(id, self.session.config().default_read_mode)
    }

    /// Fetch by composite key values in declared key order.
    ///
    /// A null element is rejected before the arity check; the arity must
    /// then equal the declared key field count, even for single-field keys.
    pub fn get_by_composite_id(
        &self,
        keys: &[Value],
        mode: ReadMode,
    ) -> Result<Option<Loaded<E>>, RepoError> {
        self.get_by_id(IdValue::Composite(keys.to_vec()), mode)
    }

    /// Re-attach a detached value. The snapshot is the stored row, so any
    /// difference between `entity` and the store is saved by the next
    /// `save_tracked`.
    pub fn attach(&self, entity: E) -> Result<Loaded<E>, RepoError> {
        self.session.with_metrics(|| {
            let desc = self.session.resolve::<E>()?;
            let key = desc.key_of(&entity)?;

            let row = self
                .session
                .store()
                .find(E::PATH, &key)?
                .ok_or_else(|| RepoError::not_found(Self::entity_name(), &key))?;

            self.debug_log(format!("attach {key}"));

            Ok(Loaded::tracked(entity, key, row))
        })
    }
}
