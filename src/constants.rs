//! Constants shared across the converter.
//!
//! File extensions and default file names live here so the reader, the
//! writer and the command line front-end agree on them.

/// Extension of native scene documents (without the dot).
pub const SCENE_EXTENSION: &str = "scn";

/// Extension of material documents (without the dot).
pub const MATERIAL_EXTENSION: &str = "mat";

/// Configuration file looked up in the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "scenec.toml";

/// Probe options enabled by `A`.
pub const ALL_PROBE_OPTIONS: &str = "btrspud";

/// Environment variable that overrides the log filter.
pub const LOG_ENV_VAR: &str = "RUST_LOG";
