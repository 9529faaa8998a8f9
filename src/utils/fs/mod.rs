//! File system utilities used by the reader and the writer
//!
//! Output files are written atomically so a partially written scene or
//! material document is never visible to other tools. Copies and document
//! writes create missing parent directories.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scenec_cli::utils::fs::{atomic_write, copy_file, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> std::io::Result<()> {
//! ensure_dir(Path::new("out/Models"))?;
//! copy_file(Path::new("assets/textures/a.png"), Path::new("out/Models/textures/a.png"))?;
//! atomic_write(Path::new("out/Models/scene.scn"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod paths;

pub use atomic::atomic_write;
pub use dirs::{copy_file, ensure_dir, ensure_parent_dir};
pub use formats::{read_toml_file, write_json_file};
pub use paths::{
    canonicalize_dir, has_extension, normalize_path, relativize, to_asset_path, with_extension,
};
