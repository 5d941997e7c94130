//! Declaration model produced by a source parser.
//!
//! Every container is generic over its type representation: the parser hands
//! over `Package<TypeDescriptor>`, and resolution produces a new
//! `Package<TypeRef>` without touching the scanned value.

use serde::{Deserialize, Serialize};
use std::fmt;

///
/// TypeDescriptor
///
/// Raw type reference exactly as the parser saw it. Named references already
/// carry the path of the package that declares them.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Basic {
        name: String,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Named {
        package: String,
        name: String,
    },
    Pointer {
        inner: Box<TypeDescriptor>,
    },
    Sequence {
        elem: Box<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    #[must_use]
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic { name: name.into() }
    }

    #[must_use]
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            package: package.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn sequence(elem: Self) -> Self {
        Self::Sequence {
            elem: Box::new(elem),
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn pointer(inner: Self) -> Self {
        Self::Pointer {
            inner: Box::new(inner),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { name } => f.write_str(name),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Named { package, name } => write!(f, "{package}.{name}"),
            Self::Pointer { inner } => write!(f, "*{inner}"),
            Self::Sequence { elem } => write!(f, "[]{elem}"),
        }
    }
}

///
/// Package
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Package<T = TypeDescriptor> {
    pub path: String,
    pub name: String,

    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record<T>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumGroup>,

    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function<T>>,
}

impl<T> Package<T> {
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            records: Vec::new(),
            enums: Vec::new(),
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_record(mut self, record: Record<T>) -> Self {
        self.records.push(record);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, group: EnumGroup) -> Self {
        self.enums.push(group);
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: Function<T>) -> Self {
        self.functions.push(function);
        self
    }

    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Record<T>> {
        self.records.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn enum_group(&self, name: &str) -> Option<&EnumGroup> {
        self.enums.iter().find(|e| e.name == name)
    }
}

///
/// Record
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record<T = TypeDescriptor> {
    pub name: String,

    #[serde(default = "Vec::new")]
    pub fields: Vec<Field<T>>,
}

impl<T> Record<T> {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }
}

///
/// Field
///
/// `tag` is the explicitly pinned field number, when the source declared one.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field<T = TypeDescriptor> {
    pub name: String,
    pub ty: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<i64>,
}

impl<T> Field<T> {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: T) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
        }
    }

    #[must_use]
    pub fn tagged(name: impl Into<String>, ty: T, tag: i64) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: Some(tag),
        }
    }
}

///
/// EnumGroup
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumGroup {
    pub name: String,

    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumGroup {
    #[must_use]
    pub fn new<'a>(name: impl Into<String>, values: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(name, value)| EnumValue {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        }
    }
}

///
/// EnumValue
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

///
/// Function
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Function<T = TypeDescriptor> {
    pub name: String,

    #[serde(default = "Vec::new")]
    pub params: Vec<T>,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Function<T> {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = T>,
        results: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}
