use crate::output;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, warn};
use proteus_schema::{
    ConfigError, Error as SchemaError, Mode, Options, generate, source::MemorySource,
};
use std::{
    error::Error,
    path::{Path, PathBuf},
};

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "proteus", version, about = "Generate schema packages from source declarations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter implied by `-v`, when any was given.
    #[must_use]
    pub const fn log_filter(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

///
/// Command
///

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate messages and enums only.
    Proto(GenerateArgs),

    /// Generate messages, enums and service bindings.
    Rpc(GenerateArgs),
}

impl Command {
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Proto(_) => Mode::Schema,
            Self::Rpc(_) => Mode::Rpc,
        }
    }

    #[must_use]
    pub const fn args(&self) -> &GenerateArgs {
        match self {
            Self::Proto(args) | Self::Rpc(args) => args,
        }
    }
}

///
/// GenerateArgs
///

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// JSON declaration dump produced by the source parser.
    #[arg(long, env = "PROTEUS_DECLARATIONS")]
    pub declarations: PathBuf,

    /// Package to generate; repeat for several.
    #[arg(short = 'p', long = "pkg", value_name = "PATH")]
    pub packages: Vec<String>,

    /// Output folder, overriding `base_path` from the config file.
    #[arg(short = 'f', long = "folder")]
    pub folder: Option<PathBuf>,

    /// Display name used for every generated package.
    #[arg(long)]
    pub name: Option<String>,

    /// Config file; defaults to `proteus.toml` in the working directory.
    #[arg(long, env = "PROTEUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fail if anything was reported.
    #[arg(long)]
    pub strict: bool,

    /// Process packages on the calling thread only.
    #[arg(long)]
    pub sequential: bool,
}

impl GenerateArgs {
    /// Merge flags over the config file found from `cwd`.
    pub fn options(&self, mode: Mode, cwd: &Path) -> Result<Options, ConfigError> {
        let mut options = match &self.config {
            Some(path) => Options::load(cwd.join(path))?,
            None => Options::load_optional(cwd)?.unwrap_or_default(),
        };

        if !self.packages.is_empty() {
            options.packages.clone_from(&self.packages);
        }
        if let Some(folder) = &self.folder {
            options.base_path.clone_from(folder);
        }
        if self.name.is_some() {
            options.package_name_override.clone_from(&self.name);
        }
        if self.strict {
            options.strict = true;
        }
        if self.sequential {
            options.parallel = false;
        }
        options.mode = mode;

        Ok(options)
    }
}

/// Run one CLI invocation from the working directory.
pub fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let args = cli.command.args();
    let options = args.options(cli.command.mode(), Path::new("."))?;
    let source = MemorySource::from_json_file(&args.declarations)?;

    info!(
        "generating {} package(s) in {} mode",
        options.packages.len(),
        options.mode
    );

    let generation = match generate(&options, &source) {
        Ok(generation) => generation,
        Err(SchemaError::Strict(diagnostics)) => {
            for diagnostic in &diagnostics {
                warn!("{diagnostic}");
            }
            return Err(format!(
                "strict mode: {} diagnostic(s) reported",
                diagnostics.len()
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    };

    for diagnostic in generation.diagnostics() {
        warn!("{diagnostic}");
    }

    let written = output::write_all(&options.base_path, &generation)?;
    info!("wrote {} schema file(s)", written.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn subcommand_selects_mode() {
        let proto = parse(&["proteus", "proto", "--declarations", "decl.json", "-p", "a"]);
        let rpc = parse(&["proteus", "rpc", "--declarations", "decl.json", "-p", "a"]);

        assert_eq!(proto.command.mode(), Mode::Schema);
        assert_eq!(rpc.command.mode(), Mode::Rpc);
    }

    #[test]
    fn repeated_packages_are_collected() {
        let cli = parse(&[
            "proteus",
            "proto",
            "--declarations",
            "decl.json",
            "-p",
            "example.com/a",
            "--pkg",
            "example.com/b",
        ]);

        assert_eq!(cli.command.args().packages, ["example.com/a", "example.com/b"]);
    }

    #[test]
    fn verbosity_maps_to_filter() {
        let quiet = parse(&["proteus", "proto", "--declarations", "d.json"]);
        let loud = parse(&["proteus", "-vv", "proto", "--declarations", "d.json"]);

        assert_eq!(quiet.log_filter(), None);
        assert_eq!(loud.log_filter(), Some("trace"));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["proteus", "emit"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("proteus.toml"),
            r#"
packages = ["example.com/from-file"]
base_path = "out"
strict = false
mode = "rpc"
"#,
        )
        .unwrap();

        let cli = parse(&[
            "proteus",
            "proto",
            "--declarations",
            "d.json",
            "-f",
            "generated",
            "--name",
            "api",
            "--strict",
            "--sequential",
        ]);
        let options = cli
            .command
            .args()
            .options(cli.command.mode(), dir.path())
            .unwrap();

        assert_eq!(options.packages, ["example.com/from-file"]);
        assert_eq!(options.base_path, PathBuf::from("generated"));
        assert_eq!(options.package_name_override.as_deref(), Some("api"));
        assert_eq!(options.mode, Mode::Schema);
        assert!(options.strict);
        assert!(!options.parallel);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["proteus", "rpc", "--declarations", "d.json", "-p", "x"]);

        let options = cli
            .command
            .args()
            .options(cli.command.mode(), dir.path())
            .unwrap();

        assert_eq!(options.packages, ["x"]);
        assert_eq!(options.base_path, PathBuf::from("."));
        assert!(options.parallel);
        assert_eq!(options.mode, Mode::Rpc);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&[
            "proteus",
            "proto",
            "--declarations",
            "d.json",
            "--config",
            "missing.toml",
        ]);

        let err = cli
            .command
            .args()
            .options(cli.command.mode(), dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
