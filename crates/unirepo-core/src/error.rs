use crate::{db::store::StoreError, traits::FieldSetError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// RepoError
///
/// Every failure a repository call can surface. Argument, arity and schema
/// errors are raised before the store is touched; store failures propagate
/// unchanged.
///

#[derive(Debug, ThisError)]
pub enum RepoError {
    #[error("required argument '{argument}' was not supplied")]
    NullArgument { argument: &'static str },

    #[error("entity '{entity}' declares {expected} key field(s), {found} key value(s) supplied")]
    ArityMismatch {
        entity: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("key field '{entity}.{field}' expects {expected}, found {found}")]
    KeyTypeMismatch {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{entity} with key {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Field(#[from] FieldSetError),
}

impl RepoError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NullArgument { .. }
            | Self::ArityMismatch { .. }
            | Self::InvalidArgument { .. }
            | Self::KeyTypeMismatch { .. } => ErrorClass::Argument,
            Self::Schema(_) => ErrorClass::Schema,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Store(err) => err.class(),
            Self::Field(_) => ErrorClass::Corruption,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::ArityMismatch { .. } | Self::KeyTypeMismatch { .. } => ErrorOrigin::Predicate,
            Self::Schema(_) => ErrorOrigin::Key,
            Self::Store(_) | Self::Field(_) => ErrorOrigin::Store,
            Self::NullArgument { .. } | Self::InvalidArgument { .. } | Self::NotFound { .. } => {
                ErrorOrigin::Repository
            }
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// SchemaError
///
/// Mapping defects: the entity's key cannot be resolved from its declared
/// model, a registration, or the store's model.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("no primary key for type {entity}")]
    MissingPrimaryKey { entity: &'static str },

    #[error("primary key of {entity} names unknown field '{field}'")]
    UnknownKeyField { entity: &'static str, field: String },

    #[error("primary key field '{entity}.{field}' has unkeyable kind {kind}")]
    UnkeyableField {
        entity: &'static str,
        field: &'static str,
        kind: &'static str,
    },

    #[error("conflicting key registration for {entity}")]
    ConflictingRegistration { entity: &'static str },
}

///
/// ErrorClass
/// Coarse taxonomy the host layer maps onto its own responses.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Argument,
    Schema,
    NotFound,
    Conflict,
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Argument => "argument",
            Self::Schema => "schema",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Key,
    Predicate,
    Repository,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Key => "key",
            Self::Predicate => "predicate",
            Self::Repository => "repository",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_classify_as_client_errors() {
        let errs = [
            RepoError::NullArgument { argument: "id" },
            RepoError::ArityMismatch {
                entity: "UserRole",
                expected: 2,
                found: 1,
            },
            RepoError::invalid_argument("keys", "element 0 is null"),
        ];

        for err in errs {
            assert_eq!(err.class(), ErrorClass::Argument, "{err}");
        }
    }

    #[test]
    fn arity_message_names_both_counts_and_entity() {
        let err = RepoError::ArityMismatch {
            entity: "UserRole",
            expected: 2,
            found: 1,
        };

        let msg = err.to_string();
        assert!(msg.contains("UserRole"));
        assert!(msg.contains('2'));
        assert!(msg.contains('1'));
        assert_eq!(err.origin(), ErrorOrigin::Predicate);
    }

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = RepoError::not_found("Person", "(42)");

        assert!(err.is_not_found());
        assert_eq!(
            err.display_with_class(),
            "repository:not_found: Person with key (42) not found"
        );
    }

    #[test]
    fn schema_error_wraps_transparently() {
        let err: RepoError = SchemaError::MissingPrimaryKey { entity: "Orphan" }.into();

        assert_eq!(err.to_string(), "no primary key for type Orphan");
        assert_eq!(err.class(), ErrorClass::Schema);
    }
}
