//! Core runtime for UniRepo: values, entity traits, key metadata, predicates,
//! the store seam, and the universal repository built on top of them.
#![warn(unreachable_pub)]

extern crate self as unirepo;

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod model;
pub mod obs;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Loaded, ReadMode},
        key::IdValue,
        model::{entity::EntityModel, field::EntityFieldModel},
        traits::{EntityKind, EntitySchema, FieldValue, FieldValues, FieldValuesMut, Path},
        types::{Timestamp, Ulid},
        value::Value,
    };
}
