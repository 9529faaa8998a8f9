//! Path utilities for the source and target asset trees.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// Logical resolution only: the file system is not touched and symlinks are
/// not followed.
///
/// ```rust
/// use scenec_cli::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Canonicalizes a directory, failing if it does not exist or is a file.
pub fn canonicalize_dir(path: &Path) -> io::Result<PathBuf> {
    let canonical = path.canonicalize()?;
    if !canonical.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a directory: {}", path.display()),
        ));
    }
    Ok(canonical)
}

/// `path` relative to `root`, or `None` when `path` is outside `root`.
///
/// Both paths are normalized first; neither is required to exist.
#[must_use]
pub fn relativize(root: &Path, path: &Path) -> Option<PathBuf> {
    let root = normalize_path(root);
    let path = normalize_path(path);
    path.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Render a relative file system path as an asset path with `/` separators.
#[must_use]
pub fn to_asset_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Case-insensitive extension check, `ext` without the dot.
#[must_use]
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext))
}

/// Append `.ext` to `name` unless it already ends with it (any case).
#[must_use]
pub fn with_extension(name: &str, ext: &str) -> String {
    if has_extension(name, ext) {
        name.to_string()
    } else {
        format!("{name}.{ext}")
    }
}
