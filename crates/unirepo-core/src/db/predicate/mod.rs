mod ast;
mod eval;
mod key;

pub use ast::*;
pub use key::KeyPredicate;

use crate::traits::FieldValues;

impl Predicate {
    /// Evaluate against anything exposing `FieldValues` (entities or rows).
    #[must_use]
    pub fn matches<R: FieldValues + ?Sized>(&self, row: &R) -> bool {
        eval::eval(row, self)
    }
}
