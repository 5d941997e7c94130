use crate::types::Primitive;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

/// Source built-in scalars and their schema primitive.
const SCALARS: &[(&str, Primitive)] = &[
    ("bool", Primitive::Bool),
    ("byte", Primitive::Uint32),
    ("float32", Primitive::Float),
    ("float64", Primitive::Double),
    ("int", Primitive::Int64),
    ("int16", Primitive::Int32),
    ("int32", Primitive::Int32),
    ("int64", Primitive::Int64),
    ("int8", Primitive::Int32),
    ("rune", Primitive::Int32),
    ("string", Primitive::String),
    ("uint", Primitive::Uint64),
    ("uint16", Primitive::Uint32),
    ("uint32", Primitive::Uint32),
    ("uint64", Primitive::Uint64),
    ("uint8", Primitive::Uint32),
    ("uintptr", Primitive::Uint64),
];

/// Element types whose sequence is a raw byte buffer.
const BYTE_ELEMENTS: &[&str] = &["byte", "uint8"];

/// Declared types outside the scanned packages with a fixed schema mapping.
const EXTERNAL: &[(&str, &str, Primitive)] = &[
    ("encoding/json", "RawMessage", Primitive::Bytes),
    ("net", "IP", Primitive::Bytes),
    ("time", "Duration", Primitive::Int64),
    ("time", "Time", Primitive::Timestamp),
];

static STANDARD: LazyLock<Builtins> = LazyLock::new(|| {
    let mut builtins = Builtins::empty();
    for (name, primitive) in SCALARS {
        builtins.insert_scalar(*name, *primitive);
    }
    for name in BYTE_ELEMENTS {
        builtins.insert_byte_element(*name);
    }
    for (package, name, primitive) in EXTERNAL {
        builtins.insert_external(*package, *name, *primitive);
    }

    builtins
});

///
/// Builtins
///
/// Built-in scalar table plus the secondary table of well-known external
/// types. Lookups never allocate.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Builtins {
    scalars: BTreeMap<String, Primitive>,
    byte_elements: BTreeSet<String>,
    external: BTreeMap<String, BTreeMap<String, Primitive>>,
}

impl Builtins {
    /// The default mapping for Go-style source packages.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert_scalar(&mut self, name: impl Into<String>, primitive: Primitive) {
        self.scalars.insert(name.into(), primitive);
    }

    pub fn insert_byte_element(&mut self, name: impl Into<String>) {
        self.byte_elements.insert(name.into());
    }

    pub fn insert_external(
        &mut self,
        package: impl Into<String>,
        name: impl Into<String>,
        primitive: Primitive,
    ) {
        self.external
            .entry(package.into())
            .or_default()
            .insert(name.into(), primitive);
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<Primitive> {
        self.scalars.get(name).copied()
    }

    #[must_use]
    pub fn is_byte_element(&self, name: &str) -> bool {
        self.byte_elements.contains(name)
    }

    #[must_use]
    pub fn external(&self, package: &str, name: &str) -> Option<Primitive> {
        self.external.get(package)?.get(name).copied()
    }
}
