use log::debug;
use proteus_schema::Generation;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Component, Path, PathBuf},
};

/// File written for every generated package.
pub const SCHEMA_FILE_NAME: &str = "schema.json";

/// Where a package's schema lands under `base`.
///
/// Every segment of the package path must be a plain name, so the result
/// always stays inside `base`.
pub fn schema_path(base: &Path, package_path: &str) -> io::Result<PathBuf> {
    if package_path.starts_with('/') || package_path.contains('\\') {
        return Err(unsafe_path(package_path));
    }

    let mut path = base.to_path_buf();
    for segment in package_path.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => path.push(name),
            _ => return Err(unsafe_path(package_path)),
        }
    }

    if path == base {
        return Err(unsafe_path(package_path));
    }

    Ok(path.join(SCHEMA_FILE_NAME))
}

fn unsafe_path(package_path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("package path '{package_path}' does not map to a directory under the output folder"),
    )
}

/// Write one pretty-printed schema file per package, returning the paths.
pub fn write_all(base: &Path, generation: &Generation) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(generation.packages.len());

    for package in &generation.packages {
        let path = schema_path(base, &package.path)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &package.schema)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proteus_schema::{
        Options, generate,
        decl::{Field, Package, Record, TypeDescriptor},
        model::SchemaPackage,
        source::MemorySource,
    };

    #[test]
    fn schema_path_nests_package_segments() {
        let path = schema_path(Path::new("out"), "example.com/people").unwrap();

        assert_eq!(
            path,
            Path::new("out").join("example.com").join("people").join("schema.json")
        );
    }

    #[test]
    fn schema_path_rejects_escaping_segments() {
        let base = Path::new("/tmp/out");

        for bad in ["../../etc/evil", "example.com/../../x", "./a", "/etc/evil", "", "a\\..\\b"] {
            let err = schema_path(base, bad).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{bad}");
        }
    }

    #[test]
    fn write_all_refuses_paths_outside_base() {
        let package = Package::new("../escape", "escape").with_record(Record::new(
            "Thing",
            [Field::new("name", TypeDescriptor::basic("string"))],
        ));
        let source = MemorySource::from_packages([package]);
        let generation = generate(&Options::for_packages(["../escape"]), &source).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let err = write_all(&out, &generation).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!dir.path().join("escape").exists());
    }

    #[test]
    fn written_files_parse_back() {
        let package = Package::new("example.com/people", "people").with_record(Record::new(
            "Person",
            [Field::new("name", TypeDescriptor::basic("string"))],
        ));
        let source = MemorySource::from_packages([package]);
        let generation =
            generate(&Options::for_packages(["example.com/people"]), &source).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = write_all(dir.path(), &generation).unwrap();

        assert_eq!(written.len(), 1);
        let text = fs::read_to_string(&written[0]).unwrap();
        let schema: SchemaPackage = serde_json::from_str(&text).unwrap();
        assert_eq!(schema, generation.packages[0].schema);
    }
}
