use crate::{
    db::{
        Loaded,
        repository::UniversalRepository,
        store::{Row, Store},
    },
    error::RepoError,
    key::IdValue,
    obs::sink::ExecKind,
    traits::EntityKind,
};

impl<E: EntityKind, S: Store> UniversalRepository<'_, E, S> {
    /// Persist a new entity and return its key.
    ///
    /// A row with the same key already in the store surfaces as the
    /// store's conflict error.
    pub fn create(&self, entity: E) -> Result<IdValue, RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Save);
            let desc = self.session.resolve::<E>()?;
            let key = desc.key_of(&entity)?;
            let row = Row::from_entity(&entity);

            let mut store = self.session.store_mut();
            store.add(E::PATH, key.clone(), row);
            let applied = self.commit(&mut store)?;

            span.set_rows(applied as u64);
            self.debug_log(format!("create {key}"));

            Ok(key.to_id())
        })
    }

    /// Overwrite every field of the stored row with `entity`'s values.
    /// No prior read; a missing row surfaces as the store's error.
    pub fn update(&self, entity: &E) -> Result<(), RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Save);
            let desc = self.session.resolve::<E>()?;
            let key = desc.key_of(entity)?;

            let mut store = self.session.store_mut();
            store.replace(E::PATH, key.clone(), Row::from_entity(entity));
            let applied = self.commit(&mut store)?;

            span.set_rows(applied as u64);
            self.debug_log(format!("update {key}"));

            Ok(())
        })
    }

    /// Merge `entity` into the stored row.
    ///
    /// Loads the current row (`NotFound` if absent, store untouched) and
    /// writes only the fields whose values differ. There is no version
    /// check: concurrent patches are last-writer-wins per field.
    pub fn patch(&self, entity: &E) -> Result<(), RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Save);
            let desc = self.session.resolve::<E>()?;
            let key = desc.key_of(entity)?;

            let current = self
                .session
                .store()
                .find(E::PATH, &key)?
                .ok_or_else(|| RepoError::not_found(Self::entity_name(), &key))?;
            let changes = current.diff(&Row::from_entity(entity));

            if changes.is_empty() {
                self.debug_log(format!("patch {key}: no changes"));
                return Ok(());
            }

            let changed = changes.len();
            let mut store = self.session.store_mut();
            store.patch(E::PATH, key.clone(), changes);
            self.commit(&mut store)?;

            span.set_rows(1);
            self.debug_log(format!("patch {key}: {changed} field(s)"));

            Ok(())
        })
    }

    /// Persist the mutations made to a tracked value since it was loaded
    /// (or last saved). Returns the number of changed fields; a detached
    /// value is a no-op returning 0.
    pub fn save_tracked(&self, loaded: &mut Loaded<E>) -> Result<usize, RepoError> {
        let Some(snapshot) = loaded.snapshot() else {
            self.debug_log(format!("save_tracked {}: detached, skipped", loaded.key()));
            return Ok(0);
        };

        let saved = self.session.with_metrics(|| -> Result<(usize, Row), RepoError> {
            let mut span = self.span(ExecKind::Save);
            let desc = self.session.resolve::<E>()?;
            let key = desc.key_of(loaded.entity())?;
            if key != *loaded.key() {
                return Err(RepoError::invalid_argument(
                    "entity",
                    format!(
                        "key of tracked {} changed from {} to {key}",
                        Self::entity_name(),
                        loaded.key()
                    ),
                ));
            }

            let current = Row::from_entity(loaded.entity());
            let changes = snapshot.diff(&current);
            let changed = changes.len();

            if changed > 0 {
                let mut store = self.session.store_mut();
                store.patch(E::PATH, key.clone(), changes);
                self.commit(&mut store)?;
                span.set_rows(1);
            }

            self.debug_log(format!("save_tracked {key}: {changed} field(s)"));

            Ok((changed, current))
        });

        let (changed, current) = saved?;
        loaded.rebase(current);

        Ok(changed)
    }
}
