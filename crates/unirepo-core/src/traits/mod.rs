
use crate::{
    model::{entity::EntityModel, field::EntityFieldKind},
    types::{Timestamp, Ulid},
    value::Value,
};
use thiserror::Error as ThisError;

// ============================================================================
// FOUNDATIONAL KINDS
// ============================================================================

///
/// Path
/// Fully-qualified schema path.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// EntitySchema
///
/// Declared schema facts for an entity.
///

pub trait EntitySchema: Path {
    const MODEL: &'static EntityModel;
}

///
/// EntityKind
///
/// Everything the repository needs from an entity type: its model, a
/// field-level read and write surface, and owned, cloneable values.
///

pub trait EntityKind:
    EntitySchema + FieldValues + FieldValuesMut + Clone + Default + 'static
{
}

impl<T> EntityKind for T where
    T: EntitySchema + FieldValues + FieldValuesMut + Clone + Default + 'static
{
}

// ============================================================================
// ENTITY VALUES
// ============================================================================

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;
}

///
/// FieldValuesMut
///
/// Write side of `FieldValues`. Used to rebuild entities from stored rows
/// and to fill projection targets.
///

pub trait FieldValuesMut {
    fn set_value(&mut self, field: &str, value: &Value) -> Result<(), FieldSetError>;
}

///
/// FieldSetError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FieldSetError {
    #[error("{entity} has no field '{field}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("field '{entity}.{field}' expects {expected}, found {found}")]
    TypeMismatch {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldSetError {
    #[must_use]
    pub fn unknown_field(entity: &'static str, field: &str) -> Self {
        Self::UnknownField {
            entity,
            field: field.to_string(),
        }
    }

    #[must_use]
    pub const fn type_mismatch(
        entity: &'static str,
        field: &'static str,
        expected: EntityFieldKind,
        found: &Value,
    ) -> Self {
        Self::TypeMismatch {
            entity,
            field,
            expected: expected.label(),
            found: found.kind_label(),
        }
    }
}

///
/// FieldValue
///
/// Conversion boundary between a Rust field type and `Value`.
///

pub trait FieldValue {
    const KIND: EntityFieldKind;

    fn to_value(&self) -> Value;

    #[must_use]
    fn from_value(value: &Value) -> Option<Self>
    where
        Self: Sized;
}

impl FieldValue for String {
    const KIND: EntityFieldKind = EntityFieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: EntityFieldKind = EntityFieldKind::Blob;

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for () {
    const KIND: EntityFieldKind = EntityFieldKind::Unit;

    fn to_value(&self) -> Value {
        Value::Unit
    }

    fn from_value(value: &Value) -> Option<Self> {
        matches!(value, Value::Unit).then_some(())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: EntityFieldKind = T::KIND;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if matches!(value, Value::Null) {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                const KIND: EntityFieldKind = EntityFieldKind::$variant;

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => (*v).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

// integers report their width alongside the variant
macro_rules! impl_field_value_int {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                const KIND: EntityFieldKind = EntityFieldKind::$variant { bits: <$type>::BITS };

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => (*v).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_value_int!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
);

impl_field_value!(
    bool => Bool,
    f64 => Float64,
    Timestamp => Timestamp,
    Ulid => Ulid,
);
