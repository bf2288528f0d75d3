use crate::{db::predicate::Predicate, error::RepoError, key::KeyDescriptor, value::Value};

///
/// KeyPredicate
///
/// Builds `key_1 == v_1 AND key_2 == v_2 AND ...` for an entity's declared
/// key. Each value is first converted to its field's native key type, so a
/// mis-typed value fails here instead of silently matching nothing.
///

pub struct KeyPredicate;

impl KeyPredicate {
    pub fn build(values: &[Value], desc: &KeyDescriptor) -> Result<Predicate, RepoError> {
        if values.len() != desc.arity() {
            return Err(desc.arity_mismatch(values.len()));
        }

        let mut terms = Vec::with_capacity(values.len());
        for (i, (field, value)) in desc.fields().iter().zip(values).enumerate() {
            let key = desc.convert(i, value)?;
            terms.push(Predicate::eq(field.name, key.to_value()));
        }

        Ok(Predicate::And(terms))
    }
}
