//! ## Crate layout
//! - `core`: runtime values, entity model, key metadata, predicates, the
//!   store seam and the universal repository.
//! - `entity`: attribute macro declaring an entity's path, name and key.
//!
//! The runtime modules are re-exported at the top level so macro output
//! (`::unirepo::traits::...`) resolves against this crate.

pub use unirepo_core as core;
pub use unirepo_core::{config, db, error, key, model, obs, traits, types, value};
pub use unirepo_derive::entity;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Common entrypoints
//

pub use unirepo_core::{
    config::RepoConfig,
    db::{Query, Session, UniversalRepository, store::MemoryStore},
    error::RepoError,
    key::MetadataCache,
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::entity;
    pub use unirepo_core::{
        db::{Loaded, ReadMode, predicate::Predicate},
        key::IdValue,
        traits::{EntityKind as _, EntitySchema as _, FieldValues as _, Path as _},
        types::{Timestamp, Ulid},
        value::Value,
    };
}
