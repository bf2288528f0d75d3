use crate::model::field::EntityFieldModel;

///
/// EntityModel
/// Minimal, macro-generated runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified Rust type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Stable external name used in errors and logs.
    pub entity_name: &'static str,
    /// Declared key fields in key order. Empty when the entity declares none
    /// and the key must come from a registration or the store's model.
    pub primary_key: &'static [&'static str],
    /// Ordered field list (authoritative for projection and row mapping).
    pub fields: &'static [EntityFieldModel],
}

impl EntityModel {
    /// Exact, case-sensitive field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static EntityFieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Case-insensitive field lookup, used by column selection.
    #[must_use]
    pub fn field_ignore_case(&self, name: &str) -> Option<&'static EntityFieldModel> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub const fn declares_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Iterate field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }
}
