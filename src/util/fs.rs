//! Filesystem utilities.
//!
//! The emitter's only filesystem effects are creating the output
//! directories it references (spec §4.2 `ensure-directory-exists`, §4.8
//! item 3) and writing the final `.bff` file (§6). Nothing else in this
//! crate touches disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it (and parents) if necessary.
/// Idempotent; silent if the directory already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// `ensure-directory-exists(p, root)` from spec §4.2: if `p` is absolute,
/// create it directly; otherwise create it relative to `root`.
pub fn ensure_directory_exists(p: &Path, root: &Path) -> Result<()> {
    let target = if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
    ensure_dir(&target)
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn ensure_directory_exists_relative_joins_root() {
        let tmp = TempDir::new().unwrap();
        ensure_directory_exists(Path::new("out/obj"), tmp.path()).unwrap();
        assert!(tmp.path().join("out/obj").is_dir());
    }

    #[test]
    fn ensure_directory_exists_absolute_ignores_root() {
        let tmp = TempDir::new().unwrap();
        let abs = tmp.path().join("abs-out");
        ensure_directory_exists(&abs, Path::new("/nonexistent-root-for-test")).unwrap();
        assert!(abs.is_dir());
    }

    #[test]
    fn write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("nested/dir/fbuild.bff");
        write_string(&file, "; hello\n").unwrap();
        assert_eq!(fs::read_to_string(file).unwrap(), "; hello\n");
    }
}
