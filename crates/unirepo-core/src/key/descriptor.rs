use crate::{
    error::{RepoError, SchemaError},
    key::{IdValue, Key, StorageKey},
    model::{entity::EntityModel, field::EntityFieldKind},
    traits::FieldValues,
    value::Value,
};
use std::fmt;

type Converter = fn(EntityFieldKind, &Value) -> Option<Key>;

///
/// KeyField
///
/// One declared key field with the converter chosen for its kind.
/// The converter is picked once when the descriptor is built; integer
/// converters also check the field's width.
///

#[derive(Clone, Copy)]
pub struct KeyField {
    pub name: &'static str,
    pub kind: EntityFieldKind,
    convert: Converter,
}

impl KeyField {
    pub(crate) fn new(
        entity: &'static str,
        name: &'static str,
        kind: EntityFieldKind,
    ) -> Result<Self, SchemaError> {
        let convert: Converter = match kind {
            EntityFieldKind::Int { .. } => convert_int,
            EntityFieldKind::Uint { .. } => convert_uint,
            EntityFieldKind::Text => convert_text,
            EntityFieldKind::Timestamp => convert_timestamp,
            EntityFieldKind::Ulid => convert_ulid,
            other => {
                return Err(SchemaError::UnkeyableField {
                    entity,
                    field: name,
                    kind: other.label(),
                });
            }
        };

        Ok(Self {
            name,
            kind,
            convert,
        })
    }

    /// Coerce a supplied value into this field's native key type.
    #[must_use]
    pub fn convert(&self, value: &Value) -> Option<Key> {
        (self.convert)(self.kind, value)
    }
}

impl fmt::Debug for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for KeyField {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for KeyField {}

fn convert_int(kind: EntityFieldKind, value: &Value) -> Option<Key> {
    let v = match value {
        Value::Int(v) => *v,
        Value::Uint(v) => i64::try_from(*v).ok()?,
        _ => return None,
    };

    kind.admits_int(i128::from(v)).then_some(Key::Int(v))
}

fn convert_uint(kind: EntityFieldKind, value: &Value) -> Option<Key> {
    let v = match value {
        Value::Uint(v) => *v,
        Value::Int(v) => u64::try_from(*v).ok()?,
        _ => return None,
    };

    kind.admits_int(i128::from(v)).then_some(Key::Uint(v))
}

fn convert_text(_: EntityFieldKind, value: &Value) -> Option<Key> {
    match value {
        Value::Text(v) => Some(Key::Text(v.clone())),
        _ => None,
    }
}

fn convert_timestamp(_: EntityFieldKind, value: &Value) -> Option<Key> {
    match value {
        Value::Timestamp(v) => Some(Key::Timestamp(*v)),
        _ => None,
    }
}

fn convert_ulid(_: EntityFieldKind, value: &Value) -> Option<Key> {
    match value {
        Value::Ulid(v) => Some(Key::Ulid(*v)),
        _ => None,
    }
}

///
/// KeyDescriptor
///
/// Resolved primary-key shape of one entity type. Immutable once built;
/// shared through the metadata cache.
///

#[derive(Debug, Eq, PartialEq)]
pub struct KeyDescriptor {
    pub entity_path: &'static str,
    pub entity_name: &'static str,
    fields: Vec<KeyField>,
}

impl KeyDescriptor {
    /// Build a descriptor from key field names, validated against the model.
    pub(crate) fn from_names<'a>(
        model: &'static EntityModel,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, SchemaError> {
        let mut fields = Vec::new();
        for name in names {
            let field = model.field(name).ok_or_else(|| SchemaError::UnknownKeyField {
                entity: model.entity_name,
                field: name.to_string(),
            })?;
            fields.push(KeyField::new(model.entity_name, field.name, field.kind)?);
        }

        if fields.is_empty() {
            return Err(SchemaError::MissingPrimaryKey {
                entity: model.entity_name,
            });
        }

        Ok(Self {
            entity_path: model.path,
            entity_name: model.entity_name,
            fields,
        })
    }

    #[must_use]
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    #[must_use]
    pub fn is_key_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    ///
    /// CONVERSION
    ///

    /// Convert one value for the field at `index`. An index past the last
    /// key field is an arity mismatch.
    pub fn convert(&self, index: usize, value: &Value) -> Result<Key, RepoError> {
        let field = self
            .fields
            .get(index)
            .ok_or_else(|| self.arity_mismatch(index + 1))?;

        field.convert(value).ok_or(RepoError::KeyTypeMismatch {
            entity: self.entity_name,
            field: field.name,
            expected: field.kind.label(),
            found: value.kind_label(),
        })
    }

    /// Single-key fast path: convert against the first key field.
    pub fn convert_single(&self, value: &Value) -> Result<StorageKey, RepoError> {
        if self.is_composite() {
            return Err(self.arity_mismatch(1));
        }

        self.convert(0, value).map(StorageKey::single)
    }

    /// Convert an ordered list of values into a storage key.
    pub fn bind(&self, values: &[Value]) -> Result<StorageKey, RepoError> {
        if values.len() != self.arity() {
            return Err(self.arity_mismatch(values.len()));
        }

        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.convert(i, v))
            .collect::<Result<Vec<_>, _>>()
            .map(StorageKey::new)
    }

    /// Bind a caller-supplied identifier, dispatching on its shape.
    pub fn bind_id(&self, id: &IdValue) -> Result<StorageKey, RepoError> {
        match id {
            IdValue::Single(value) => self.convert_single(value),
            IdValue::Composite(values) => self.bind(values),
        }
    }

    /// Read the key of an entity (or row). Null or missing key fields are
    /// an invalid argument.
    pub fn key_of<T: FieldValues + ?Sized>(&self, source: &T) -> Result<StorageKey, RepoError> {
        let mut parts = Vec::with_capacity(self.arity());

        for (i, field) in self.fields.iter().enumerate() {
            let value = source
                .get_value(field.name)
                .filter(|v| !v.is_null())
                .ok_or_else(|| {
                    RepoError::invalid_argument(
                        "entity",
                        format!("key field '{}.{}' is null", self.entity_name, field.name),
                    )
                })?;

            parts.push(self.convert(i, &value)?);
        }

        Ok(StorageKey::new(parts))
    }

    pub(crate) fn arity_mismatch(&self, found: usize) -> RepoError {
        RepoError::ArityMismatch {
            entity: self.entity_name,
            expected: self.fields.len(),
            found,
        }
    }
}
