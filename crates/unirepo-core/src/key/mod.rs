mod cache;
mod descriptor;
#[cfg(test)]
mod tests;

use crate::{
    types::{Timestamp, Ulid},
    value::Value,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use cache::MetadataCache;
pub use descriptor::{KeyDescriptor, KeyField};

///
/// Key
///
/// One normalized primary-key component. Only keyable field kinds can
/// produce one, so a `Key` always compares against its own variant.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Key {
    Int(i64),
    #[display("'{_0}'")]
    Text(String),
    Timestamp(Timestamp),
    Uint(u64),
    Ulid(Ulid),
}

impl Key {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(v) => Value::Int(*v),
            Self::Text(v) => Value::Text(v.clone()),
            Self::Timestamp(v) => Value::Timestamp(*v),
            Self::Uint(v) => Value::Uint(*v),
            Self::Ulid(v) => Value::Ulid(*v),
        }
    }
}

/// Implements `From<T> for Key` for simple conversions.
macro_rules! impl_from_key {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Key {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    }
}

impl_from_key! {
    i8  => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8  => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    String => Text,
    &str => Text,
    Timestamp => Timestamp,
    Ulid => Ulid,
}

///
/// StorageKey
///
/// The full primary key of one row, components in declared key order.
/// A single-field key is a one-element `StorageKey`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct StorageKey(Vec<Key>);

impl StorageKey {
    #[must_use]
    pub const fn new(parts: Vec<Key>) -> Self {
        Self(parts)
    }

    #[must_use]
    pub fn single(key: impl Into<Key>) -> Self {
        Self(vec![key.into()])
    }

    #[must_use]
    pub fn parts(&self) -> &[Key] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert back into the identifier shape callers supply.
    #[must_use]
    pub fn to_id(&self) -> IdValue {
        match self.0.as_slice() {
            [only] => IdValue::Single(only.to_value()),
            parts => IdValue::Composite(parts.iter().map(Key::to_value).collect()),
        }
    }
}

impl<K: Into<Key>> FromIterator<K> for StorageKey {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str(")")
    }
}

///
/// IdValue
///
/// Identifier as supplied by a caller: one opaque value, or an ordered
/// sequence for composite keys. A sequence always takes the composite path,
/// even when it holds a single element.
///

#[derive(Clone, Debug, PartialEq)]
pub enum IdValue {
    Single(Value),
    Composite(Vec<Value>),
}

impl IdValue {
    pub fn composite<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Composite(parts.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// True for the one "missing argument" an identifier can express.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Single(Value::Null))
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Composite(parts) => parts,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.values().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part:?}")?;
        }
        f.write_str(")")
    }
}

impl From<Value> for IdValue {
    fn from(value: Value) -> Self {
        match value {
            Value::List(parts) => Self::Composite(parts),
            other => Self::Single(other),
        }
    }
}

impl From<Vec<Value>> for IdValue {
    fn from(parts: Vec<Value>) -> Self {
        Self::Composite(parts)
    }
}

impl From<&[Value]> for IdValue {
    fn from(parts: &[Value]) -> Self {
        Self::Composite(parts.to_vec())
    }
}

impl<const N: usize> From<[Value; N]> for IdValue {
    fn from(parts: [Value; N]) -> Self {
        Self::Composite(parts.into())
    }
}

impl From<&StorageKey> for IdValue {
    fn from(key: &StorageKey) -> Self {
        key.to_id()
    }
}

/// Implements `From<T> for IdValue` for scalar identifiers.
macro_rules! impl_from_id_value {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for IdValue {
                fn from(v: $ty) -> Self {
                    Self::Single(v.into())
                }
            }
        )*
    }
}

impl_from_id_value!(i32, i64, u32, u64, String, &str, Timestamp, Ulid);
