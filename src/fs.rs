//! narrow filesystem primitives shared by the backup and restore engines

use std::fs;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// copy a single file, overwriting the destination if it exists
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_path(dst)?;
    Ok(())
}

/// remove a directory entry, recursing into directories
pub fn remove_entry(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).with_path(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).with_path(path)
    } else {
        fs::remove_file(path).with_path(path)
    }
}

/// remove every entry directly under `dir` except the one named `keep`
pub fn clear_dir_except(dir: &Path, keep: &str) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        if entry.file_name() == keep {
            continue;
        }
        remove_entry(&entry.path())?;
    }
    Ok(())
}
