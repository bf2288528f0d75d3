//! The repository runtime: sessions, the store seam, key predicates, the
//! universal repository and its query surface.

pub mod predicate;
pub mod query;
pub mod repository;
pub mod store;

mod session;
mod tracked;

pub use query::Query;
pub use repository::UniversalRepository;
pub use session::Session;
pub use tracked::{Loaded, TrackingState};

use serde::{Deserialize, Serialize};

///
/// ReadMode
///
/// Whether fetched entities stay attached to the session.
///
/// Tracked  → mutations are persisted by `save_tracked`.
/// Readonly → detached snapshot; mutating it never reaches the store
///            unless the value is re-attached.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    #[default]
    Tracked,
    Readonly,
}

impl ReadMode {
    #[must_use]
    pub const fn from_readonly(readonly: bool) -> Self {
        if readonly {
            Self::Readonly
        } else {
            Self::Tracked
        }
    }

    #[must_use]
    pub const fn is_readonly(self) -> bool {
        matches!(self, Self::Readonly)
    }
}
