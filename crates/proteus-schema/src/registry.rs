use crate::types::TypeKind;
use log::trace;
use std::collections::BTreeMap;

type Entries = BTreeMap<String, BTreeMap<String, TypeKind>>;

///
/// TypeSetBuilder
///
/// Write side of the type registry, used only while scanning.
/// Insertion is idempotent: a pair that is already present keeps its first
/// kind and `add` reports that nothing was added.
///

#[derive(Debug, Default)]
pub struct TypeSetBuilder {
    entries: Entries,
}

impl TypeSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(package, name)`, returning `true` only if it was newly added.
    pub fn add(&mut self, package: &str, name: &str, kind: TypeKind) -> bool {
        let names = self.entries.entry(package.to_string()).or_default();
        if names.contains_key(name) {
            return false;
        }

        trace!("registered {kind} {package}.{name}");
        names.insert(name.to_string(), kind);

        true
    }

    #[must_use]
    pub fn kind_of(&self, package: &str, name: &str) -> Option<TypeKind> {
        self.entries.get(package)?.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the registry to further writes.
    #[must_use]
    pub fn freeze(self) -> TypeRegistry {
        TypeRegistry {
            entries: self.entries,
        }
    }
}

///
/// TypeRegistry
///
/// Immutable set of every record and enum found across all scanned packages.
/// Shared by reference between resolver and transformer workers.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeRegistry {
    entries: Entries,
}

impl TypeRegistry {
    #[must_use]
    pub fn kind_of(&self, package: &str, name: &str) -> Option<TypeKind> {
        self.entries.get(package)?.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, package: &str, name: &str) -> bool {
        self.kind_of(package, name).is_some()
    }

    #[must_use]
    pub fn is_record(&self, package: &str, name: &str) -> bool {
        self.kind_of(package, name) == Some(TypeKind::Record)
    }

    #[must_use]
    pub fn is_enum(&self, package: &str, name: &str) -> bool {
        self.kind_of(package, name) == Some(TypeKind::Enum)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(package, name, kind)` entry in path-then-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, TypeKind)> {
        self.entries.iter().flat_map(|(package, names)| {
            names
                .iter()
                .map(move |(name, kind)| (package.as_str(), name.as_str(), *kind))
        })
    }
}
