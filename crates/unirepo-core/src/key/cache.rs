use crate::{
    db::store::StoreModel,
    error::{RepoError, SchemaError},
    key::KeyDescriptor,
    traits::EntitySchema,
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

///
/// MetadataCache
///
/// Read-mostly map from entity path to its resolved `KeyDescriptor`.
/// Construct once and share by `Arc` between sessions.
///
/// Readers only take the read lock. A miss takes the write lock, checks
/// again, then builds and publishes, so every caller gets the same `Arc`.
/// Registrations live behind the same lock, so a registration and a first
/// resolution of the same entity never interleave. Failed resolutions are
/// not cached.
///

#[derive(Debug, Default)]
pub struct MetadataCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    descriptors: HashMap<&'static str, Arc<KeyDescriptor>>,
    registrations: HashMap<&'static str, Vec<&'static str>>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the key descriptor for `E`, consulting `model` only when
    /// neither the entity's own model nor a registration declares a key.
    pub fn resolve<E, M>(&self, model: &M) -> Result<Arc<KeyDescriptor>, RepoError>
    where
        E: EntitySchema,
        M: StoreModel + ?Sized,
    {
        self.resolve_traced::<E, M>(model).map(|(desc, _)| desc)
    }

    /// As `resolve`, also reporting whether the descriptor was already cached.
    pub(crate) fn resolve_traced<E, M>(
        &self,
        model: &M,
    ) -> Result<(Arc<KeyDescriptor>, bool), RepoError>
    where
        E: EntitySchema,
        M: StoreModel + ?Sized,
    {
        if let Some(desc) = self.state.read().descriptors.get(E::PATH) {
            return Ok((Arc::clone(desc), true));
        }

        let mut state = self.state.write();
        if let Some(desc) = state.descriptors.get(E::PATH) {
            return Ok((Arc::clone(desc), true));
        }

        let built = Arc::new(state.build::<E, M>(model)?);
        state.descriptors.insert(E::PATH, Arc::clone(&built));

        Ok((built, false))
    }

    /// Declare the key of an entity whose model does not declare one.
    ///
    /// Registering the same shape twice is a no-op. A different shape, or
    /// one that contradicts the entity's declared key or an already
    /// resolved descriptor, is rejected.
    pub fn register<E: EntitySchema>(&self, fields: &[&str]) -> Result<(), RepoError> {
        let desc = KeyDescriptor::from_names(E::MODEL, fields.iter().copied())?;
        let names: Vec<&'static str> = desc.field_names().collect();
        let conflict = || -> RepoError {
            SchemaError::ConflictingRegistration {
                entity: E::MODEL.entity_name,
            }
            .into()
        };

        if E::MODEL.declares_key() && E::MODEL.primary_key != names.as_slice() {
            return Err(conflict());
        }

        let mut state = self.state.write();
        if let Some(existing) = state.descriptors.get(E::PATH)
            && **existing != desc
        {
            return Err(conflict());
        }

        match state.registrations.get(E::PATH) {
            Some(existing) if *existing != names => Err(conflict()),
            Some(_) => Ok(()),
            None => {
                state.registrations.insert(E::PATH, names);
                Ok(())
            }
        }
    }

    /// Number of resolved descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().descriptors.is_empty()
    }

    #[must_use]
    pub fn contains<E: EntitySchema>(&self) -> bool {
        self.state.read().descriptors.contains_key(E::PATH)
    }
}

impl CacheState {
    // the entity's declared key, then a registration, then the store's model
    fn build<E, M>(&self, model: &M) -> Result<KeyDescriptor, RepoError>
    where
        E: EntitySchema,
        M: StoreModel + ?Sized,
    {
        if E::MODEL.declares_key() {
            return Ok(KeyDescriptor::from_names(
                E::MODEL,
                E::MODEL.primary_key.iter().copied(),
            )?);
        }

        if let Some(names) = self.registrations.get(E::PATH) {
            return Ok(KeyDescriptor::from_names(E::MODEL, names.iter().copied())?);
        }

        match model.find_primary_key(E::PATH) {
            Some(names) if !names.is_empty() => Ok(KeyDescriptor::from_names(
                E::MODEL,
                names.iter().map(String::as_str),
            )?),
            _ => Err(SchemaError::MissingPrimaryKey {
                entity: E::MODEL.entity_name,
            }
            .into()),
        }
    }
}
