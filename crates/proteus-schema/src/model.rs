//! Schema model handed to emitters, one [`SchemaPackage`] per input package.

use crate::types::{NamedRef, Primitive};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

///
/// SchemaPackage
///
/// `name` is the display name and may be overridden. `path` never changes
/// and is what imports and type references use.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SchemaPackage {
    pub path: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceDef>,
}

impl SchemaPackage {
    #[must_use]
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Imports implied by the messages and services, sorted and deduplicated.
    #[must_use]
    pub fn referenced_imports(&self) -> Vec<Import> {
        let mut imports = BTreeSet::new();

        let field_types = self
            .messages
            .iter()
            .flat_map(|m| &m.fields)
            .flat_map(|f| f.kind.types());
        for ty in field_types {
            match ty {
                FieldType::Primitive(primitive) if primitive.is_well_known() => {
                    imports.insert(Import::Timestamp);
                }
                FieldType::Message(name) | FieldType::Enum(name) if name.package != self.path => {
                    imports.insert(Import::Package(name.package.clone()));
                }
                _ => {}
            }
        }

        for service in &self.services {
            for name in [&service.request, &service.response] {
                if name.package != self.path {
                    imports.insert(Import::Package(name.package.clone()));
                }
            }
        }

        imports.into_iter().collect()
    }
}

///
/// Import
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Import {
    /// Another generated package, by path.
    Package(String),

    /// The well-known timestamp definition.
    Timestamp,
}

///
/// TypeName
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeName {
    pub package: String,
    pub name: String,
}

impl TypeName {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl From<&NamedRef> for TypeName {
    fn from(named: &NamedRef) -> Self {
        Self::new(&named.package, &named.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

///
/// Message
///
/// `reserved` lists numbers consumed by declared fields that were dropped,
/// so fixing such a field later does not renumber its siblings.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    pub name: String,
    pub fields: Vec<FieldDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<u32>,
}

impl Message {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

///
/// FieldDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
}

///
/// FieldKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Singular(FieldType),
    Repeated(FieldType),
    Map { key: FieldType, value: FieldType },
}

impl FieldKind {
    /// Every type this field refers to.
    #[must_use]
    pub fn types(&self) -> Vec<&FieldType> {
        match self {
            Self::Singular(ty) | Self::Repeated(ty) => vec![ty],
            Self::Map { key, value } => vec![key, value],
        }
    }
}

///
/// FieldType
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Primitive(Primitive),
    Message(TypeName),
    Enum(TypeName),
}

///
/// EnumDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValueDef>,
}

///
/// EnumValueDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i64,
}

///
/// ServiceDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceDef {
    pub method: String,
    pub request: TypeName,
    pub response: TypeName,
}
