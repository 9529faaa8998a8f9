//! Utilities shared by the reader, the writer and the command line front-end
//!
//! - [`fs`] - atomic writes, file copies and path helpers

pub mod fs;

pub use fs::{atomic_write, copy_file, ensure_dir, normalize_path};
