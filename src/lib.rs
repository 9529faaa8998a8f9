//! scenec - asset dependency extraction and rehoming for 3D models
//!
//! A model loaded from a source asset tree references other files: material
//! documents, textures and linked models. scenec finds every such dependency,
//! lets processors rework the model (extracting sub-trees into their own
//! files, generating material documents), and writes the model together with
//! all its dependencies into a target asset tree, rewriting every reference to
//! the new location.
//!
//! # Modules
//!
//! - [`key`] - Resource keys and typed asset keys
//! - [`scene`] - Arena-backed node tree with materials and textures
//! - [`format`] - Scene (`.scn`) and material (`.mat`) documents, loader registry
//! - [`reader`] - Loading models from a source root, on-demand asset loads
//! - [`model`] - Per-model state and the dependency graph
//! - [`writer`] - Copying and generating dependencies under a target root
//! - [`probe`] - Human-readable model descriptions
//! - [`convert`] - The processor pipeline
//! - [`config`] - `scenec.toml` settings
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types
//! - [`utils`] - File system helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use scenec_cli::convert::Convert;
//! use scenec_cli::reader::AssetReader;
//! use std::path::Path;
//!
//! # fn example() -> scenec_cli::core::Result<()> {
//! let mut convert = Convert::new(AssetReader::new(Path::new("downloads"))?);
//! convert.set_target_root("assets");
//! convert.set_target_asset_path("Models/Door");
//! let info = convert.convert(Path::new("downloads/door.scn"))?;
//! print!("{}", info.report());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod convert;
pub mod core;
pub mod format;
pub mod key;
pub mod model;
pub mod probe;
pub mod reader;
pub mod scene;
pub mod utils;
pub mod writer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
