use crate::{
    config::RepoConfig,
    db::{UniversalRepository, store::Store},
    error::RepoError,
    key::{KeyDescriptor, MetadataCache},
    obs::sink::{self, MetricsEvent, MetricsSink, with_metrics_sink},
    traits::{EntityKind, EntitySchema},
};
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
    sync::Arc,
};

///
/// Session
///
/// One unit of work over one store, with policy (debug, metrics, default
/// read mode). Operations run in the order they are issued. A session is
/// not `Sync`; the metadata cache it holds is the only state shared with
/// other sessions.
///

pub struct Session<S: Store> {
    store: RefCell<S>,
    cache: Arc<MetadataCache>,
    config: RepoConfig,
    metrics: Option<Rc<dyn MetricsSink>>,
}

impl<S: Store> Session<S> {
    #[must_use]
    pub fn new(store: S, cache: Arc<MetadataCache>) -> Self {
        Self::with_config(store, cache, RepoConfig::default())
    }

    #[must_use]
    pub const fn with_config(store: S, cache: Arc<MetadataCache>, config: RepoConfig) -> Self {
        Self {
            store: RefCell::new(store),
            cache,
            config,
            metrics: None,
        }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Route this session's metrics events to `sink` instead of the
    /// per-thread global state.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Rc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &RepoConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Repository for one entity type, bound to this session.
    #[must_use]
    pub const fn repository<E: EntityKind>(&self) -> UniversalRepository<'_, E, S> {
        UniversalRepository::new(self)
    }

    /// Borrow the underlying store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.borrow())
    }

    /// Mutably borrow the underlying store (seeding, test setup).
    pub fn with_store_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.store.borrow_mut())
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    // ---------------------------------------------------------------------
    // Crate-internal plumbing used by the repository
    // ---------------------------------------------------------------------

    pub(crate) fn store(&self) -> Ref<'_, S> {
        self.store.borrow()
    }

    pub(crate) fn store_mut(&self) -> RefMut<'_, S> {
        self.store.borrow_mut()
    }

    pub(crate) fn with_metrics<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.metrics {
            Some(sink) => with_metrics_sink(Rc::clone(sink), f),
            None => f(),
        }
    }

    /// Resolve `E`'s key through the shared cache, consulting this
    /// session's store model on a miss.
    pub(crate) fn resolve<E: EntitySchema>(&self) -> Result<Arc<KeyDescriptor>, RepoError> {
        let (desc, cache_hit) = self
            .cache
            .resolve_traced::<E, S>(&*self.store.borrow())?;

        if self.config.metrics {
            sink::record(MetricsEvent::MetadataResolve {
                entity_path: E::PATH,
                cache_hit,
            });
        }

        Ok(desc)
    }
}
