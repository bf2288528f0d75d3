use std::fmt;

///
/// EntityFieldModel
/// Runtime field metadata used by key resolution and projection.
///

#[derive(Debug)]
pub struct EntityFieldModel {
    /// Field name as used in predicates, rows and projections.
    pub name: &'static str,
    /// Runtime type shape.
    pub kind: EntityFieldKind,
}

///
/// EntityFieldKind
///
/// Aligned with `Value` variants; a lossy projection of Rust field types.
/// `Option<T>` reports the kind of `T`. Integer kinds keep their bit width
/// so key conversion can reject values the field cannot hold.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityFieldKind {
    Blob,
    Bool,
    Float64,
    Int { bits: u32 },
    List,
    Text,
    Timestamp,
    Uint { bits: u32 },
    Ulid,
    Unit,

    /// Marker for fields the runtime cannot address.
    Unsupported,
}

impl EntityFieldKind {
    /// Kinds that can take part in a primary key.
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        matches!(
            self,
            Self::Int { .. } | Self::Text | Self::Timestamp | Self::Uint { .. } | Self::Ulid
        )
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Bool => "bool",
            Self::Float64 => "float64",
            Self::Int { bits: 8 } => "i8",
            Self::Int { bits: 16 } => "i16",
            Self::Int { bits: 32 } => "i32",
            Self::Int { .. } => "i64",
            Self::List => "list",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uint { bits: 8 } => "u8",
            Self::Uint { bits: 16 } => "u16",
            Self::Uint { bits: 32 } => "u32",
            Self::Uint { .. } => "u64",
            Self::Ulid => "ulid",
            Self::Unit => "unit",
            Self::Unsupported => "unsupported",
        }
    }
}

impl EntityFieldKind {
    /// Whether an integer fits this kind's width. Non-integer kinds admit
    /// nothing.
    #[must_use]
    pub const fn admits_int(self, value: i128) -> bool {
        match self {
            Self::Int { bits } if bits > 0 && bits < 128 => {
                let max = (1i128 << (bits - 1)) - 1;
                value >= -max - 1 && value <= max
            }
            Self::Uint { bits } if bits < 128 => value >= 0 && value < (1i128 << bits),
            _ => false,
        }
    }
}

impl fmt::Display for EntityFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
