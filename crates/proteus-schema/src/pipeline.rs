//! End-to-end generation: scan, freeze, then resolve and transform each
//! package.
//!
//! The registry is complete before any package is resolved, so forward and
//! cyclic references across packages resolve regardless of request order.

use crate::{
    Error,
    diag::{Diagnostic, Diagnostics},
    model::SchemaPackage,
    resolve::Resolver,
    scan::Scanner,
    source::PackageSource,
    transform::Transformer,
    worker::fan_out,
};
use log::{debug, info};
use proteus_config::Options;

///
/// GeneratedPackage
///
/// One schema package together with everything reported about it, in phase
/// order (scan, resolve, transform).
///

#[derive(Debug)]
pub struct GeneratedPackage {
    pub path: String,
    pub schema: SchemaPackage,
    pub diagnostics: Diagnostics,
}

///
/// Generation
///
/// Packages appear in request order, minus duplicates.
///

#[derive(Debug)]
pub struct Generation {
    pub packages: Vec<GeneratedPackage>,
}

impl Generation {
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&GeneratedPackage> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Every diagnostic across all packages, package by package.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.packages.iter().flat_map(|p| p.diagnostics.iter())
    }

    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        self.packages.iter().any(|p| !p.diagnostics.is_empty())
    }
}

/// Run a full generation over `options.packages`.
///
/// Only an invalid configuration or a package that cannot be loaded is
/// fatal. In strict mode any diagnostic also fails the run, after every
/// package has been processed.
pub fn generate<S>(options: &Options, source: &S) -> Result<Generation, Error>
where
    S: PackageSource + ?Sized,
{
    options.validate()?;

    let scanned = Scanner::new(source)
        .parallel(options.parallel)
        .scan(options.packages.as_slice())?;
    let mut scan_diagnostics = scanned.diagnostics;
    let registry = scanned.registry;

    info!(
        "registered {} type(s) from {} package(s)",
        registry.len(),
        scanned.packages.len()
    );

    let resolver = Resolver::new(&registry);
    let transformer = Transformer::new(&registry)
        .mode(options.mode)
        .package_name_override(options.package_name_override.as_deref());

    let outputs = fan_out(scanned.packages, options.parallel, |package| {
        let resolved = resolver.resolve_package(&package);
        let transformed = transformer.transform(&resolved.package);

        let mut diagnostics = resolved.diagnostics;
        diagnostics.append(transformed.diagnostics);

        (package.path, transformed.schema, diagnostics)
    });

    // every scan diagnostic names a kept package, duplicates included
    let packages: Vec<_> = outputs
        .into_iter()
        .map(|(path, schema, diagnostics)| {
            let mut all = scan_diagnostics.take_package(&path);
            all.append(diagnostics);

            debug!("generated {path} with {} diagnostic(s)", all.len());

            GeneratedPackage {
                path,
                schema,
                diagnostics: all,
            }
        })
        .collect();

    let generation = Generation { packages };

    if options.strict {
        let all: Diagnostics = generation.diagnostics().cloned().collect();
        all.into_result().map_err(Error::Strict)?;
    }

    Ok(generation)
}
