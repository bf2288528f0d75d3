use crate::{
    traits::{EntitySchema, FieldSetError, FieldValues, FieldValuesMut},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Row
///
/// Stored shape of one entity: field name to value. Field order is the
/// map's order, not declaration order.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every declared field of an entity.
    pub fn from_entity<E: EntitySchema + FieldValues>(entity: &E) -> Self {
        E::MODEL
            .field_names()
            .filter_map(|name| entity.get_value(name).map(|v| (name.to_string(), v)))
            .collect()
    }

    /// Rebuild an entity. Fields absent from the row keep their defaults;
    /// columns the entity does not declare are ignored.
    pub fn to_entity<E>(&self) -> Result<E, FieldSetError>
    where
        E: EntitySchema + FieldValuesMut + Default,
    {
        let mut entity = E::default();
        for name in E::MODEL.field_names() {
            if let Some(value) = self.0.get(name) {
                entity.set_value(name, value)?;
            }
        }

        Ok(entity)
    }

    /// Fields whose value in `other` differs from (or is absent in) `self`,
    /// i.e. the changes that turn `self` into `other`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<(String, Value)> {
        other
            .0
            .iter()
            .filter(|(name, value)| self.0.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn apply(&mut self, changes: impl IntoIterator<Item = (String, Value)>) {
        self.0.extend(changes);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FieldValues for Row {
    fn get_value(&self, field: &str) -> Option<Value> {
        self.0.get(field).cloned()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
