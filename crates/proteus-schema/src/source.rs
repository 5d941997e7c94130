//! Boundary to the source parser.
//!
//! The engine never parses source text itself. It asks a [`PackageSource`]
//! for each requested package and treats a lookup failure as fatal.

use crate::decl::Package;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// SourceError
///

#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("failed to read declarations from '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed declarations: {0}")]
    Json(#[from] serde_json::Error),

    #[error("package '{0}' could not be located")]
    NotFound(String),
}

///
/// PackageSource
///
/// Loading one package must not depend on any other, so the scanner may call
/// `load_package` from several threads at once.
///

pub trait PackageSource: Sync {
    fn load_package(&self, id: &str) -> Result<Package, SourceError>;
}

impl<F> PackageSource for F
where
    F: Fn(&str) -> Result<Package, SourceError> + Sync,
{
    fn load_package(&self, id: &str) -> Result<Package, SourceError> {
        self(id)
    }
}

///
/// MemorySource
///
/// Pre-parsed declarations keyed by package path. This is also how a JSON
/// declaration dump from an out-of-process parser is loaded.
///

#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    packages: BTreeMap<String, Package>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from packages; the first package seen for a path wins.
    #[must_use]
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        let mut source = Self::new();
        for package in packages {
            source.insert(package);
        }

        source
    }

    /// Parse a JSON array of packages.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let packages: Vec<Package> = serde_json::from_str(json)?;

        Ok(Self::from_packages(packages))
    }

    /// Read and parse a JSON array of packages from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&json)
    }

    /// Insert a package, returning `false` if its path was already present.
    pub fn insert(&mut self, package: Package) -> bool {
        if self.packages.contains_key(&package.path) {
            return false;
        }
        self.packages.insert(package.path.clone(), package);

        true
    }

    /// Known package paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageSource for MemorySource {
    fn load_package(&self, id: &str) -> Result<Package, SourceError> {
        self.packages
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}
