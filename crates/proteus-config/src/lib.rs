//! Generation options shared by the schema engine and the CLI driver.
//!
//! Options are read from a `proteus.toml` file and may be overridden
//! field-by-field by the caller before validation.

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error as ThisError;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "proteus.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options: {0}")]
    Invalid(String),

    #[error("failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// Mode
///
/// Selects whether service bindings are produced alongside messages and enums.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Schema,
    Rpc,
}

impl Mode {
    #[must_use]
    pub const fn emits_services(self) -> bool {
        matches!(self, Self::Rpc)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Rpc => "rpc",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ModeParseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("unknown mode '{0}', expected 'schema' or 'rpc'")]
pub struct ModeParseError(pub String);

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" => Ok(Self::Schema),
            "rpc" => Ok(Self::Rpc),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

///
/// Options
///
/// Everything the engine needs for one generation run. `base_path` is never
/// interpreted by the engine; it is handed through to whatever writes output.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub base_path: PathBuf,
    pub packages: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name_override: Option<String>,

    pub mode: Mode,

    /// Escalate any diagnostic into a failed run.
    pub strict: bool,

    /// Scan, resolve and transform packages on scoped worker threads.
    pub parallel: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            packages: Vec::new(),
            package_name_override: None,
            mode: Mode::default(),
            strict: false,
            parallel: true,
        }
    }
}

impl Options {
    /// Build options for the given packages with every other setting defaulted.
    #[must_use]
    pub fn for_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse options from TOML text without validating them.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read options from a TOML file without validating them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Read options from `dir/proteus.toml` when the file exists.
    pub fn load_optional(dir: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }

        Self::load(path).map(Some)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one package must be requested".to_string(),
            ));
        }

        if let Some(id) = self.packages.iter().find(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "package identifier '{id}' is blank"
            )));
        }

        if let Some(name) = &self.package_name_override
            && name.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "package_name_override must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub const fn emits_services(&self) -> bool {
        self.mode.emits_services()
    }
}
