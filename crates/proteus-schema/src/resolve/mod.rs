//! Type resolution against the frozen registry and the built-in tables.
//!
//! Resolution is a pure function of the descriptor, the registry and the
//! tables. A descriptor that cannot be resolved becomes a
//! [`TypeRef::Unresolved`] node instead of an error, so one bad field never
//! blocks the rest of its message.

mod builtin;

#[cfg(test)]
mod tests;

pub use builtin::Builtins;

use crate::{
    decl::{Field, Function, Package, Record, TypeDescriptor},
    diag::{Diagnostic, DiagnosticKind, Diagnostics},
    registry::TypeRegistry,
    types::{NamedRef, Primitive, TypeKind, TypeRef, UnresolvedReason},
};
use log::debug;

///
/// Resolved
///

#[derive(Debug)]
pub struct Resolved {
    pub package: Package<TypeRef>,
    pub diagnostics: Diagnostics,
}

///
/// Resolver
///

#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    registry: &'a TypeRegistry,
    builtins: &'a Builtins,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self::with_builtins(registry, Builtins::standard())
    }

    #[must_use]
    pub const fn with_builtins(registry: &'a TypeRegistry, builtins: &'a Builtins) -> Self {
        Self { registry, builtins }
    }

    /// Classify one raw descriptor.
    #[must_use]
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> TypeRef {
        match descriptor {
            TypeDescriptor::Basic { name } => self.builtins.scalar(name).map_or_else(
                || TypeRef::unresolved(descriptor.clone(), UnresolvedReason::UnknownBuiltin),
                TypeRef::Primitive,
            ),
            TypeDescriptor::Sequence { elem } => {
                if let TypeDescriptor::Basic { name } = elem.as_ref()
                    && self.builtins.is_byte_element(name)
                {
                    return TypeRef::Primitive(Primitive::Bytes);
                }

                TypeRef::sequence(self.resolve(elem))
            }
            TypeDescriptor::Map { key, value } => self.resolve_map(descriptor, key, value),
            TypeDescriptor::Pointer { inner } => TypeRef::nullable(self.resolve(inner)),
            TypeDescriptor::Named { package, name } => {
                self.resolve_named(descriptor, package, name)
            }
        }
    }

    fn resolve_map(
        &self,
        descriptor: &TypeDescriptor,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> TypeRef {
        let key = match self.resolve(key) {
            // well-known primitives are messages on the target side
            key @ TypeRef::Primitive(primitive) if !primitive.is_well_known() => key,
            TypeRef::Named(named) if named.kind == TypeKind::Enum => TypeRef::Named(named),
            unresolved @ TypeRef::Unresolved(_) => return unresolved,
            _ => {
                return TypeRef::unresolved(descriptor.clone(), UnresolvedReason::InvalidMapKey);
            }
        };

        TypeRef::associative(key, self.resolve(value))
    }

    fn resolve_named(&self, descriptor: &TypeDescriptor, package: &str, name: &str) -> TypeRef {
        if let Some(kind) = self.registry.kind_of(package, name) {
            return TypeRef::Named(NamedRef::new(package, name, kind));
        }

        self.builtins.external(package, name).map_or_else(
            || TypeRef::unresolved(descriptor.clone(), UnresolvedReason::UnknownType),
            TypeRef::Primitive,
        )
    }

    /// Produce the resolved copy of a scanned package.
    ///
    /// Every field containing an unresolved node is reported once here; the
    /// transformer later drops it without reporting again. Function
    /// signatures are resolved but only judged when services are built.
    #[must_use]
    pub fn resolve_package(&self, package: &Package) -> Resolved {
        let mut diagnostics = Diagnostics::new();

        let records = package
            .records
            .iter()
            .map(|record| self.resolve_record(&package.path, record, &mut diagnostics))
            .collect();

        let functions = package
            .functions
            .iter()
            .map(|function| Function {
                name: function.name.clone(),
                params: function.params.iter().map(|ty| self.resolve(ty)).collect(),
                results: function.results.iter().map(|ty| self.resolve(ty)).collect(),
            })
            .collect();

        debug!(
            "resolved {}: {} unresolved field(s)",
            package.path,
            diagnostics.len()
        );

        Resolved {
            package: Package {
                path: package.path.clone(),
                name: package.name.clone(),
                records,
                enums: package.enums.clone(),
                functions,
            },
            diagnostics,
        }
    }

    fn resolve_record(
        &self,
        path: &str,
        record: &Record,
        diagnostics: &mut Diagnostics,
    ) -> Record<TypeRef> {
        let fields = record
            .fields
            .iter()
            .map(|field| {
                let ty = self.resolve(&field.ty);
                if let Some(unresolved) = ty.first_unresolved() {
                    diagnostics.push(Diagnostic::member(
                        path,
                        &record.name,
                        &field.name,
                        DiagnosticKind::UnresolvedField {
                            descriptor: unresolved.descriptor.to_string(),
                            reason: unresolved.reason,
                        },
                    ));
                }

                Field {
                    name: field.name.clone(),
                    ty,
                    tag: field.tag,
                }
            })
            .collect();

        Record {
            name: record.name.clone(),
            fields,
        }
    }
}
