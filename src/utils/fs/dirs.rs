//! Directory creation and file copies.

use std::fs;
use std::io;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if
/// necessary.
///
/// Fails if `path` exists but is not a directory.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("path exists but is not a directory: {}", path.display()),
        ));
    }
    Ok(())
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Copies a single file byte for byte, creating the target's parent
/// directories. Returns the number of bytes copied.
///
/// Copying a file onto itself is a no-op; `fs::copy` would truncate it.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if let (Ok(a), Ok(b)) = (src.canonicalize(), dst.canonicalize())
        && a == b
    {
        return Ok(fs::metadata(src)?.len());
    }
    ensure_parent_dir(dst)?;
    fs::copy(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src.png");
        fs::write(&src, b"pixels").unwrap();
        let dst = temp.path().join("out/textures/src.png");

        assert_eq!(copy_file(&src, &dst).unwrap(), 6);
        assert_eq!(fs::read(&dst).unwrap(), b"pixels");
    }

    #[test]
    fn test_copy_file_onto_itself() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("same.png");
        fs::write(&src, b"pixels").unwrap();

        copy_file(&src, &src).unwrap();
        assert_eq!(fs::read(&src).unwrap(), b"pixels");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = tempdir().unwrap();
        let err = copy_file(&temp.path().join("missing"), &temp.path().join("out")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
