use crate::{
    db::{Query, repository::UniversalRepository, store::Store},
    error::RepoError,
    obs::sink::ExecKind,
    traits::EntityKind,
};

impl<E: EntityKind, S: Store> UniversalRepository<'_, E, S> {
    /// First result of `shaper` applied to all stored entities.
    pub fn query_single<'q, R: 'q>(
        &self,
        shaper: impl FnOnce(Query<'static, E>) -> Query<'q, R>,
    ) -> Result<Option<R>, RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Query);
            let first = shaper(self.source()?).first();

            span.set_rows(u64::from(first.is_some()));
            Ok(first)
        })
    }

    /// Every result of `shaper` applied to all stored entities.
    pub fn query_collection<'q, R: 'q>(
        &self,
        shaper: impl FnOnce(Query<'static, E>) -> Query<'q, R>,
    ) -> Result<Vec<R>, RepoError> {
        self.session.with_metrics(|| {
            let mut span = self.span(ExecKind::Query);
            let results = shaper(self.source()?).into_vec();

            span.set_rows(results.len() as u64);
            Ok(results)
        })
    }

    /// First entity matching `filter`, projected.
    pub fn get_projection<R>(
        &self,
        projection: impl FnMut(E) -> R,
        filter: impl FnMut(&E) -> bool,
    ) -> Result<Option<R>, RepoError> {
        self.query_single(|q| q.filter(filter).map(projection))
    }

    /// Every entity matching `filter`, projected.
    pub fn get_projections<R>(
        &self,
        projection: impl FnMut(E) -> R,
        filter: impl FnMut(&E) -> bool,
    ) -> Result<Vec<R>, RepoError> {
        self.query_collection(|q| q.filter(filter).map(projection))
    }

    // Detached entities in key order; the queryable every shaper starts from.
    fn source(&self) -> Result<Query<'static, E>, RepoError> {
        let rows = self.session.store().scan(E::PATH)?;
        self.debug_log(format!("query source: {} row(s)", rows.len()));

        let entities = rows
            .into_iter()
            .map(|(_, row)| row.to_entity::<E>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Query::from_vec(entities))
    }
}
