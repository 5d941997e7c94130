use crate::decl::TypeDescriptor;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Primitive
///
/// Built-in scalar kinds of the target schema. `Timestamp` is the canonical
/// well-known timestamp message and is the only one that needs an import.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    Bytes,
    Double,
    Float,
    Int32,
    Int64,
    String,
    Timestamp,
    Uint32,
    Uint64,
}

impl Primitive {
    /// Name of the scalar as written in a schema definition.
    #[must_use]
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::String => "string",
            Self::Timestamp => "google.protobuf.Timestamp",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    #[must_use]
    pub const fn is_well_known(self) -> bool {
        matches!(self, Self::Timestamp)
    }
}

///
/// TypeKind
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[display("record")]
    Record,

    #[display("enum")]
    Enum,
}

///
/// NamedRef
///
/// Resolved reference to a known record or enum. Only the owning package path
/// and the type name are stored, so self and mutual references never expand.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NamedRef {
    pub package: String,
    pub name: String,
    pub kind: TypeKind,
}

impl NamedRef {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }
}

impl fmt::Display for NamedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

///
/// UnresolvedReason
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    #[display("map key must be a primitive or an enum")]
    InvalidMapKey,

    #[display("not a known built-in type")]
    UnknownBuiltin,

    #[display("not a scanned record or enum, and no external mapping exists")]
    UnknownType,
}

///
/// Unresolved
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Unresolved {
    pub descriptor: TypeDescriptor,
    pub reason: UnresolvedReason,
}

///
/// TypeRef
///
/// Fully resolved type of a field, parameter or result.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Primitive(Primitive),
    Named(NamedRef),
    Sequence(Box<TypeRef>),
    Associative {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    Nullable(Box<TypeRef>),
    Unresolved(Unresolved),
}

impl TypeRef {
    #[must_use]
    pub fn sequence(elem: Self) -> Self {
        Self::Sequence(Box::new(elem))
    }

    #[must_use]
    pub fn associative(key: Self, value: Self) -> Self {
        Self::Associative {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    #[must_use]
    pub const fn unresolved(descriptor: TypeDescriptor, reason: UnresolvedReason) -> Self {
        Self::Unresolved(Unresolved { descriptor, reason })
    }

    /// Peel off every `Nullable` wrapper.
    #[must_use]
    pub fn strip_nullable(&self) -> &Self {
        let mut ty = self;
        while let Self::Nullable(inner) = ty {
            ty = inner;
        }

        ty
    }

    /// First unresolved node in depth-first order, if any.
    #[must_use]
    pub fn first_unresolved(&self) -> Option<&Unresolved> {
        match self {
            Self::Primitive(_) | Self::Named(_) => None,
            Self::Sequence(inner) | Self::Nullable(inner) => inner.first_unresolved(),
            Self::Associative { key, value } => key
                .first_unresolved()
                .or_else(|| value.first_unresolved()),
            Self::Unresolved(unresolved) => Some(unresolved),
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.first_unresolved().is_none()
    }

    /// Record reference behind any nullable wrappers.
    #[must_use]
    pub fn as_record(&self) -> Option<&NamedRef> {
        match self.strip_nullable() {
            Self::Named(named) if named.kind == TypeKind::Record => Some(named),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => f.write_str(primitive.schema_name()),
            Self::Named(named) => write!(f, "{named}"),
            Self::Sequence(elem) => write!(f, "sequence<{elem}>"),
            Self::Associative { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Nullable(inner) => write!(f, "nullable<{inner}>"),
            Self::Unresolved(unresolved) => write!(f, "unresolved<{}>", unresolved.descriptor),
        }
    }
}
