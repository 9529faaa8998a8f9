//! Command-line interface for scenec.
//!
//! # Commands
//!
//! - `convert` - Rehome models and their dependencies into a target tree
//! - `probe` - Print the node tree, materials and dependencies of models
//!
//! # Global Options
//!
//! - `-v, --verbose` - Debug logging
//! - `-q, --quiet` - Errors only
//! - `--config FILE` - Settings file (defaults to `scenec.toml` when present)
//!
//! ```bash
//! scenec convert --source-root downloads/door --target-root assets \
//!     --target-path Models/Door --extract handle=Handle door.scn
//! scenec probe --source-root downloads/door --options bd door.scn
//! ```

mod convert;
mod probe;

pub use convert::{ConvertCommand, Extraction};
pub use probe::ProbeCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ConvertConfig;
use crate::constants::LOG_ENV_VAR;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,

    /// Explicit settings file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
    ///
    /// Only the first call in a process has any effect.
    pub fn init_logging(&self) {
        let level = self.log_level.as_deref().unwrap_or("info");
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the settings file named by `--config`, or the default one.
    pub fn load_settings(&self) -> Result<ConvertConfig> {
        ConvertConfig::load_with_optional(self.config_path.as_deref())
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "scenec",
    about = "Rehome 3D models and their assets into a target asset tree",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output. Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a settings file.
    ///
    /// Without it, `scenec.toml` in the working directory is used if present.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert models into the target asset tree.
    ///
    /// See [`ConvertCommand`] for options.
    Convert(ConvertCommand),

    /// Describe models without writing anything.
    ///
    /// See [`ProbeCommand`] for options.
    Probe(ProbeCommand),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    /// Run the subcommand with `config` instead of the parsed global flags.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let settings = config.load_settings()?;

        match self.command {
            Commands::Convert(cmd) => cmd.execute(settings),
            Commands::Probe(cmd) => cmd.execute(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::try_parse_from(["scenec", "-v", "probe", "a.scn"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::try_parse_from(["scenec", "probe", "--quiet", "a.scn"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("error"));

        let cli = Cli::try_parse_from(["scenec", "probe", "a.scn"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["scenec", "-v", "-q", "probe", "a.scn"]).is_err());
    }

    #[test]
    fn test_config_path_is_global() {
        let cli =
            Cli::try_parse_from(["scenec", "convert", "--config", "alt.toml", "a.scn"]).unwrap();
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn test_cli_config_builder() {
        let config = CliConfig::new().with_log_level("trace").with_config_path("x.toml");
        assert_eq!(config.log_level.as_deref(), Some("trace"));
        assert_eq!(config.config_path, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_models_are_required() {
        assert!(Cli::try_parse_from(["scenec", "convert"]).is_err());
    }
}
