//! Script discovery: deterministic recursive directory walk.

use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Return the extension of `path`'s basename, including the leading dot.
///
/// The extension is everything from the last `.` of the basename, so
/// `archive.tar.gz` yields `.gz` and a dotfile such as `.sql` yields `.sql`.
/// Returns `None` when the basename has no dot.
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rfind('.').map(|pos| &name[pos..])
}

/// Walk `root` and return every non-directory entry whose extension matches
/// one of `extensions`, or every non-directory entry when `extensions` is
/// empty.
///
/// Entries are visited in lexicographic file-name order at each level and
/// subdirectories are descended in place, so the result is stable across
/// runs and platforms. Symlinks are reported as files and never followed.
pub fn walk_files(root: &Path, extensions: &[&str]) -> CoreResult<Vec<PathBuf>> {
    let meta = fs::symlink_metadata(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::RootNotFound {
                path: root.display().to_string(),
            }
        } else {
            CoreError::IoWithPath {
                path: root.display().to_string(),
                source: e,
            }
        }
    })?;

    let mut files = Vec::new();
    if meta.is_dir() {
        walk_dir(root, extensions, &mut files)?;
    } else if matches_extension(root, extensions) {
        files.push(root.to_path_buf());
    }
    Ok(files)
}

fn walk_dir(dir: &Path, extensions: &[&str], files: &mut Vec<PathBuf>) -> CoreResult<()> {
    let io_err = |e: std::io::Error| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        if file_type.is_dir() {
            walk_dir(&path, extensions, files)?;
        } else if matches_extension(&path, extensions) {
            files.push(path);
        }
    }
    Ok(())
}

fn matches_extension(path: &Path, extensions: &[&str]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    file_extension(path).is_some_and(|ext| extensions.contains(&ext))
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
