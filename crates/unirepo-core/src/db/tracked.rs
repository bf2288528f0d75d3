use crate::{db::store::Row, key::StorageKey, traits::FieldValues, value::Value};
use derive_more::{Deref, DerefMut};

///
/// TrackingState
///

#[derive(Clone, Debug, PartialEq)]
pub enum TrackingState {
    /// Attached; `snapshot` is the stored row as of load or last save.
    Tracked { snapshot: Row },
    Detached,
}

///
/// Loaded
///
/// An entity fetched through a repository, with its storage key and
/// whether the session observes its mutations.
///

#[derive(Clone, Debug, Deref, DerefMut, PartialEq)]
pub struct Loaded<E> {
    #[deref]
    #[deref_mut]
    entity: E,
    key: StorageKey,
    state: TrackingState,
}

impl<E> Loaded<E> {
    pub(crate) const fn tracked(entity: E, key: StorageKey, snapshot: Row) -> Self {
        Self {
            entity,
            key,
            state: TrackingState::Tracked { snapshot },
        }
    }

    pub(crate) const fn detached(entity: E, key: StorageKey) -> Self {
        Self {
            entity,
            key,
            state: TrackingState::Detached,
        }
    }

    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        matches!(self.state, TrackingState::Tracked { .. })
    }

    #[must_use]
    pub const fn key(&self) -> &StorageKey {
        &self.key
    }

    #[must_use]
    pub const fn entity(&self) -> &E {
        &self.entity
    }

    #[must_use]
    pub const fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Stop observing mutations; later saves of this value are no-ops.
    pub fn detach(&mut self) {
        self.state = TrackingState::Detached;
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        self.entity
    }

    pub(crate) const fn snapshot(&self) -> Option<&Row> {
        match &self.state {
            TrackingState::Tracked { snapshot } => Some(snapshot),
            TrackingState::Detached => None,
        }
    }

    // after a successful save the persisted row is the new baseline
    pub(crate) fn rebase(&mut self, snapshot: Row) {
        self.state = TrackingState::Tracked { snapshot };
    }
}

impl<E: FieldValues> FieldValues for Loaded<E> {
    fn get_value(&self, field: &str) -> Option<Value> {
        self.entity.get_value(field)
    }
}
