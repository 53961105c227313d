//! Local filesystem helpers: directory creation, streamed writes, and the
//! recursive copy that moves a checked-out subtree into the output
//! directory while preserving permission bits.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Stream `content` into a file at `path`, creating parent directories as
/// needed.
pub fn save_to_file(path: &Path, mut content: impl Read) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    io::copy(&mut content, &mut file)?;
    Ok(())
}

/// Recursively copy the tree under `src` into `dst`.
///
/// Directories are recreated with their permission bits; regular files are
/// copied with `fs::copy`, which carries the mode bits over. Symlinks are
/// followed and their targets copied as plain files.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    fs::set_permissions(dst, fs::metadata(src)?.permissions())?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            io::Error::other(format!(
                "walked entry {} escaped the copy root",
                entry.path().display()
            ))
        })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            fs::set_permissions(&target, entry.metadata().map_err(io::Error::from)?.permissions())?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("a/b/c");
        ensure_dir(&deep).unwrap();
        assert!(deep.is_dir());
        // A second call on an existing directory is fine.
        ensure_dir(&deep).unwrap();
    }

    #[test]
    fn test_save_to_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/file.txt");
        save_to_file(&path, "payload".as_bytes()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "payload");
    }

    #[test]
    fn test_copy_dir_all_mirrors_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        fs::create_dir_all(src.join("inner/deeper")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("inner/mid.txt"), b"mid").unwrap();
        fs::write(src.join("inner/deeper/leaf.txt"), b"leaf").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dst.join("inner/mid.txt")).unwrap(), "mid");
        assert_eq!(
            fs::read_to_string(dst.join("inner/deeper/leaf.txt")).unwrap(),
            "leaf"
        );
    }

    #[test]
    fn test_copy_dir_all_includes_empty_directories() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        fs::create_dir_all(src.join("empty")).unwrap();
        copy_dir_all(&src, &dst).unwrap();
        assert!(dst.join("empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_all_preserves_file_modes() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        fs::create_dir_all(&src).unwrap();
        let script = src.join("run.sh");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        copy_dir_all(&src, &dst).unwrap();

        let mode = fs::metadata(dst.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_copy_dir_all_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("file.txt"), b"same").unwrap();

        copy_dir_all(&src, &dst).unwrap();
        copy_dir_all(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "same");
    }
}
