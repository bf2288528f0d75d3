//! Runtime data model definitions.
//!
//! Types in `model` are the *runtime representations* of an entity's
//! declared shape: its path, its name, its ordered field list and the
//! key fields it declares. They are emitted as `'static` consts by the
//! `#[entity]` attribute and read by key resolution, predicate building
//! and dynamic projection.
pub mod entity;
pub mod field;
