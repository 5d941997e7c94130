//! Resolved packages to schema model.
//!
//! Problems are isolated to the smallest entity that owns them: a bad field
//! is dropped from its message, a bad tag drops its message, a bad function
//! is skipped. Everything else in the package is still produced.

mod field;
mod number;


pub use number::{MAX_FIELD_NUMBER, RESERVED_NUMBERS};

use crate::{
    decl::{EnumGroup, Function, Package, Record},
    diag::{Diagnostic, DiagnosticKind, Diagnostics, SkipReason},
    model::{EnumDef, EnumValueDef, FieldDef, Message, SchemaPackage, ServiceDef, TypeName},
    registry::TypeRegistry,
    types::TypeRef,
};
use convert_case::{Case, Casing};
use log::debug;
use proteus_config::Mode;
use std::collections::{BTreeMap, BTreeSet};

///
/// Transformed
///

#[derive(Debug)]
pub struct Transformed {
    pub schema: SchemaPackage,
    pub diagnostics: Diagnostics,
}

///
/// Transformer
///

#[derive(Clone, Copy, Debug)]
pub struct Transformer<'a> {
    registry: &'a TypeRegistry,
    mode: Mode,
    package_name_override: Option<&'a str>,
}

impl<'a> Transformer<'a> {
    #[must_use]
    pub const fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            mode: Mode::Schema,
            package_name_override: None,
        }
    }

    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn package_name_override(mut self, name: Option<&'a str>) -> Self {
        self.package_name_override = name;
        self
    }

    /// Build the schema model for one resolved package.
    #[must_use]
    pub fn transform(&self, package: &Package<TypeRef>) -> Transformed {
        let mut diagnostics = Diagnostics::new();
        let path = package.path.as_str();

        let messages = package
            .records
            .iter()
            .filter(|record| self.registry.is_record(path, &record.name))
            .filter_map(|record| message(path, record, &mut diagnostics))
            .collect();

        let enums = package
            .enums
            .iter()
            .filter(|group| self.registry.is_enum(path, &group.name))
            .filter_map(|group| enum_def(path, group, &mut diagnostics))
            .collect();

        let services = if self.mode.emits_services() {
            self.services(path, &package.functions, &mut diagnostics)
        } else {
            Vec::new()
        };

        let mut schema = SchemaPackage {
            path: package.path.clone(),
            name: self
                .package_name_override
                .map_or_else(|| package.name.clone(), str::to_string),
            imports: Vec::new(),
            messages,
            enums,
            services,
        };
        schema.imports = schema.referenced_imports();

        debug!(
            "transformed {path}: {} message(s), {} enum(s), {} service(s)",
            schema.messages.len(),
            schema.enums.len(),
            schema.services.len()
        );

        Transformed {
            schema,
            diagnostics,
        }
    }

    fn services(
        &self,
        path: &str,
        functions: &[Function<TypeRef>],
        diagnostics: &mut Diagnostics,
    ) -> Vec<ServiceDef> {
        let mut methods = BTreeSet::new();
        let mut services = Vec::new();

        for function in functions {
            let binding = self.binding(function).and_then(|service| {
                if methods.insert(service.method.clone()) {
                    Ok(service)
                } else {
                    Err(SkipReason::DuplicateMethod)
                }
            });

            match binding {
                Ok(service) => services.push(service),
                Err(reason) => diagnostics.push(Diagnostic::item(
                    path,
                    &function.name,
                    DiagnosticKind::SkippedFunction { reason },
                )),
            }
        }

        services
    }

    // One record in, one record out; anything else is not a service method.
    fn binding(&self, function: &Function<TypeRef>) -> Result<ServiceDef, SkipReason> {
        let ([param], [result]) = (function.params.as_slice(), function.results.as_slice()) else {
            return Err(SkipReason::Arity {
                params: function.params.len(),
                results: function.results.len(),
            });
        };

        Ok(ServiceDef {
            method: function.name.clone(),
            request: self.record_name(param, "parameter")?,
            response: self.record_name(result, "result")?,
        })
    }

    fn record_name(&self, ty: &TypeRef, position: &'static str) -> Result<TypeName, SkipReason> {
        match ty.as_record() {
            Some(named) if self.registry.is_record(&named.package, &named.name) => {
                Ok(TypeName::from(named))
            }
            _ => Err(SkipReason::NotRecord {
                position,
                ty: ty.to_string(),
            }),
        }
    }
}

// Field names follow the target convention.
fn field_name(name: &str) -> String {
    name.to_case(Case::Snake)
}

fn message(path: &str, record: &Record<TypeRef>, diagnostics: &mut Diagnostics) -> Option<Message> {
    let numbers = match number::assign(
        record
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.tag)),
    ) {
        Ok(numbers) => numbers,
        Err(err) => {
            diagnostics.push(Diagnostic::member(path, &record.name, err.field, err.kind));
            return None;
        }
    };

    let mut fields = Vec::with_capacity(record.fields.len());
    let mut reserved = Vec::new();
    let mut names = BTreeSet::new();

    for (field, number) in record.fields.iter().zip(numbers) {
        // already reported during resolution
        if !field.ty.is_resolved() {
            reserved.push(number);
            continue;
        }

        let shape = match field::classify(&field.ty) {
            Ok(shape) => shape,
            Err(shape) => {
                diagnostics.push(Diagnostic::member(
                    path,
                    &record.name,
                    &field.name,
                    DiagnosticKind::UnsupportedShape { shape },
                ));
                reserved.push(number);
                continue;
            }
        };

        let name = field_name(&field.name);
        if !names.insert(name.clone()) {
            diagnostics.push(Diagnostic::member(
                path,
                &record.name,
                &field.name,
                DiagnosticKind::DuplicateField { name, number },
            ));
            reserved.push(number);
            continue;
        }

        if let Some(primitive) = shape.nullable_primitive {
            diagnostics.push(Diagnostic::member(
                path,
                &record.name,
                &field.name,
                DiagnosticKind::NullablePrimitive { primitive },
            ));
        }

        fields.push(FieldDef {
            name,
            number,
            kind: shape.kind,
        });
    }

    reserved.sort_unstable();

    Some(Message {
        name: record.name.clone(),
        fields,
        reserved,
    })
}

fn enum_def(path: &str, group: &EnumGroup, diagnostics: &mut Diagnostics) -> Option<EnumDef> {
    let Some(first) = group.values.first() else {
        diagnostics.push(Diagnostic::item(path, &group.name, DiagnosticKind::EmptyEnum));
        return None;
    };

    if first.value != 0 {
        diagnostics.push(Diagnostic::item(
            path,
            &group.name,
            DiagnosticKind::EnumBaseline { value: first.value },
        ));
    }

    let mut seen: BTreeMap<i64, &str> = BTreeMap::new();
    let mut values = Vec::with_capacity(group.values.len());

    for value in &group.values {
        if i32::try_from(value.value).is_err() {
            diagnostics.push(Diagnostic::member(
                path,
                &group.name,
                &value.name,
                DiagnosticKind::EnumValueRange { value: value.value },
            ));
            continue;
        }

        if let Some(existing) = seen.get(&value.value) {
            diagnostics.push(Diagnostic::member(
                path,
                &group.name,
                &value.name,
                DiagnosticKind::DuplicateEnumValue {
                    value: value.value,
                    existing: (*existing).to_string(),
                },
            ));
            continue;
        }
        seen.insert(value.value, &value.name);

        values.push(EnumValueDef {
            name: value.name.clone(),
            number: value.value,
        });
    }

    if values.is_empty() {
        return None;
    }

    Some(EnumDef {
        name: group.name.clone(),
        values,
    })
}
