//! ## Crate layout
//! - `decl`: declarations as delivered by a package source.
//! - `source`: the package source seam and an in-memory implementation.
//! - `scan`: package loading and type registration.
//! - `registry`: the two-phase type set (builder, then frozen registry).
//! - `resolve`: descriptor resolution against the registry and builtins.
//! - `transform`: resolved packages to the schema model.
//! - `model`: the schema model consumed by emitters.
//! - `diag`: accumulated diagnostics.
//! - `pipeline`: the end-to-end `generate` entry point.

pub mod decl;
pub mod diag;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod source;
pub mod transform;
pub mod types;

mod worker;

pub use pipeline::{GeneratedPackage, Generation, generate};
pub use proteus_config::{ConfigError, Mode, Options};

use crate::{diag::Diagnostics, source::SourceError};
use thiserror::Error as ThisError;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Error
///
/// Fatal outcomes of a generation run. Everything else is a diagnostic.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("strict mode: {count} diagnostic(s) reported\n{diagnostics}", count = .0.len(), diagnostics = .0)]
    Strict(Diagnostics),
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, GeneratedPackage, Generation, Mode, Options,
        decl::{EnumGroup, Field, Function, Package, Record, TypeDescriptor},
        diag::{Diagnostic, DiagnosticKind, Diagnostics},
        generate,
        model::{FieldKind, FieldType, Import, SchemaPackage},
        source::{MemorySource, PackageSource, SourceError},
        types::{Primitive, TypeKind, TypeRef},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Diagnostic, DiagnosticKind};

    #[test]
    fn strict_error_lists_count_and_diagnostics() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::item("a", "Status", DiagnosticKind::EmptyEnum));

        let text = Error::Strict(diagnostics).to_string();

        assert!(text.starts_with("strict mode: 1 diagnostic(s) reported\n"));
        assert!(text.contains("a::Status: enum declares no values"));
    }

    #[test]
    fn layer_errors_convert() {
        let err: Error = SourceError::NotFound("example.com/x".to_string()).into();
        assert!(matches!(err, Error::Source(_)));

        let err: Error = ConfigError::Invalid("empty".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn prelude_covers_a_full_run() {
        use crate::prelude::*;

        let package = Package::new("example.com/a", "a").with_record(Record::new(
            "Thing",
            [Field::new("name", TypeDescriptor::basic("string"))],
        ));
        let source = MemorySource::from_packages([package]);

        let generation: Generation =
            generate(&Options::for_packages(["example.com/a"]), &source).unwrap();
        let generated: &GeneratedPackage = generation.package("example.com/a").unwrap();

        assert_eq!(generated.schema.messages.len(), 1);
    }
}
