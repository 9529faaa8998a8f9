//! Atomic file writes using a temp-and-rename strategy.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::dirs::ensure_dir;

/// Atomically writes bytes to a file.
///
/// The content goes to a temporary file in the target directory, is synced to
/// disk and then renamed over `path`, so readers see either the old or the new
/// content. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
