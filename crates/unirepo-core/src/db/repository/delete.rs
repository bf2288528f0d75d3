use crate::{
    db::{repository::UniversalRepository, store::Store},
    error::RepoError,
    key::IdValue,
    obs::sink::ExecKind,
    traits::EntityKind,
};

impl<E: EntityKind, S: Store> UniversalRepository<'_, E, S> {
    /// Remove the row with `id`. The row is fetched first; deleting a
    /// missing row is `NotFound`, not a silent success.
    pub fn delete(&self, id: impl Into<IdValue>) -> Result<(), RepoError> {
        let id = id.into();
        if id.is_null() {
            return Err(RepoError::NullArgument { argument: "id" });
        }

        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Delete);

            let (key, row) = self.fetch(&id)?;
            if row.is_none() {
                return Err(RepoError::not_found(Self::entity_name(), &key));
            }

            let mut store = self.session.store_mut();
            store.remove(E::PATH, key.clone());
            self.commit(&mut store)?;

            span.set_rows(1);
            self.debug_log(format!("delete {key}"));

            Ok(())
        })
    }
}
