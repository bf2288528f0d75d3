use crate::{
    db::query::Query,
    traits::{EntitySchema, FieldSetError, FieldValues, FieldValuesMut},
};

///
/// ColumnMap
///
/// Source-to-target field pairs for a dynamic projection, resolved once
/// per call from the requested column names.
///

struct ColumnMap(Vec<(&'static str, &'static str)>);

impl ColumnMap {
    // Columns match case-insensitively on both sides; a name unknown to
    // either the source or the target is skipped.
    fn resolve<T: EntitySchema, D: EntitySchema>(columns: &[&str]) -> Self {
        let mut pairs: Vec<(&'static str, &'static str)> = Vec::with_capacity(columns.len());

        for column in columns {
            let Some(source) = T::MODEL.field_ignore_case(column) else {
                continue;
            };
            let Some(target) = D::MODEL.field_ignore_case(column) else {
                continue;
            };
            if !pairs.iter().any(|(_, t)| *t == target.name) {
                pairs.push((source.name, target.name));
            }
        }

        Self(pairs)
    }

    fn project<T: FieldValues, D: FieldValuesMut + Default>(
        &self,
        item: &T,
    ) -> Result<D, FieldSetError> {
        let mut out = D::default();
        for (source, target) in &self.0 {
            if let Some(value) = item.get_value(source) {
                out.set_value(target, &value)?;
            }
        }

        Ok(out)
    }
}

impl<'a, T: EntitySchema + FieldValues + 'a> Query<'a, T> {
    /// Dynamic projection: copy only the named columns into a fresh `D`.
    ///
    /// Column names match case-insensitively against both `T` and `D`;
    /// names either side does not declare are ignored, and every other
    /// field of `D` keeps its default. A column whose value `D` cannot
    /// hold is an error.
    pub fn select_columns<D>(self, columns: &[&str]) -> Result<Vec<D>, FieldSetError>
    where
        D: EntitySchema + FieldValuesMut + Default,
    {
        let map = ColumnMap::resolve::<T, D>(columns);

        self.map(|item| map.project::<T, D>(&item)).collect()
    }
}
