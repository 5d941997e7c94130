//! Package scanning and type registration.
//!
//! Loading is fanned out per package; registration happens afterwards in a
//! single ordered merge so the registry needs no locking and the outcome does
//! not depend on which worker finished first.

use crate::{
    decl::Package,
    diag::{Diagnostic, DiagnosticKind, Diagnostics},
    registry::{TypeRegistry, TypeSetBuilder},
    source::{PackageSource, SourceError},
    types::TypeKind,
    worker::fan_out,
};
use log::debug;
use std::collections::BTreeSet;

///
/// ScanOutput
///

#[derive(Debug)]
pub struct ScanOutput {
    pub packages: Vec<Package>,
    pub registry: TypeRegistry,
    pub diagnostics: Diagnostics,
}

///
/// Scanner
///

pub struct Scanner<'a, S: ?Sized> {
    source: &'a S,
    parallel: bool,
}

impl<'a, S: PackageSource + ?Sized> Scanner<'a, S> {
    #[must_use]
    pub const fn new(source: &'a S) -> Self {
        Self {
            source,
            parallel: false,
        }
    }

    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load every requested package and build the frozen registry.
    ///
    /// Any package that cannot be loaded aborts the scan; the error for the
    /// earliest such identifier in request order is returned.
    pub fn scan<I: AsRef<str>>(&self, ids: &[I]) -> Result<ScanOutput, SourceError> {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        let source = self.source;

        let loaded = fan_out(ids, self.parallel, |id| source.load_package(id));
        let packages = loaded.into_iter().collect::<Result<Vec<_>, _>>()?;

        let mut builder = TypeSetBuilder::new();
        let mut diagnostics = Diagnostics::new();
        let mut seen = BTreeSet::new();
        let mut scanned = Vec::with_capacity(packages.len());

        for package in packages {
            if !seen.insert(package.path.clone()) {
                diagnostics.push(Diagnostic::package(
                    &package.path,
                    DiagnosticKind::DuplicatePackage,
                ));
                continue;
            }

            scanned.push(register(package, &mut builder, &mut diagnostics));
        }

        debug!(
            "scanned {} package(s), {} type(s) registered",
            scanned.len(),
            builder.len()
        );

        Ok(ScanOutput {
            packages: scanned,
            registry: builder.freeze(),
            diagnostics,
        })
    }
}

// Register records then enums; a colliding name keeps the first declaration
// and the duplicate is removed from the package.
fn register(
    mut package: Package,
    builder: &mut TypeSetBuilder,
    diagnostics: &mut Diagnostics,
) -> Package {
    let path = package.path.clone();

    package.records.retain(|record| {
        admit(builder, diagnostics, &path, &record.name, TypeKind::Record)
    });
    package
        .enums
        .retain(|group| admit(builder, diagnostics, &path, &group.name, TypeKind::Enum));

    package
}

fn admit(
    builder: &mut TypeSetBuilder,
    diagnostics: &mut Diagnostics,
    package: &str,
    name: &str,
    kind: TypeKind,
) -> bool {
    if builder.add(package, name, kind) {
        return true;
    }

    let existing = builder.kind_of(package, name).unwrap_or(kind);
    diagnostics.push(Diagnostic::item(
        package,
        name,
        DiagnosticKind::DuplicateType {
            declared: kind,
            existing,
        },
    ));

    false
}
