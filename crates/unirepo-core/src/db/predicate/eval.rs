use crate::{
    db::predicate::{CompareOp, ComparePredicate, Predicate},
    traits::FieldValues,
    value::{Value, strict_order_cmp},
};
use std::{cmp::Ordering, mem};

///
/// Evaluate a predicate against a single row.
///
/// Any comparison between different `Value` variants, or against a missing
/// field, evaluates to `false`.
///
#[must_use]
pub(crate) fn eval<R: FieldValues + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,

        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::IsNull { field } => matches!(row.get_value(field), Some(Value::Null)),
    }
}

fn eval_compare<R: FieldValues + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    let ComparePredicate { field, op, value } = cmp;

    let Some(actual) = row.get_value(field) else {
        return false;
    };

    match op {
        CompareOp::Eq => compare_eq(&actual, value).unwrap_or(false),
        CompareOp::Ne => compare_eq(&actual, value).is_some_and(|v| !v),

        CompareOp::Lt => strict_order_cmp(&actual, value).is_some_and(Ordering::is_lt),
        CompareOp::Lte => strict_order_cmp(&actual, value).is_some_and(Ordering::is_le),
        CompareOp::Gt => strict_order_cmp(&actual, value).is_some_and(Ordering::is_gt),
        CompareOp::Gte => strict_order_cmp(&actual, value).is_some_and(Ordering::is_ge),

        CompareOp::In => match value {
            Value::List(items) => items
                .iter()
                .any(|item| compare_eq(&actual, item).unwrap_or(false)),
            _ => false,
        },
    }
}

// Equality is only defined between values of the same variant.
fn compare_eq(left: &Value, right: &Value) -> Option<bool> {
    (mem::discriminant(left) == mem::discriminant(right)).then(|| left == right)
}
