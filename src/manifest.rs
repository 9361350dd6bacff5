//! per-revision metadata: the manifest and the directory list
//!
//! both are line-oriented text files under `revisions/`, named by revision
//! number (manifest) and revision number plus a `d` suffix (directory
//! list). a revision's metadata is written once and never appended to.
//!
//! manifest lines are `<path> <digest>`. the digest is fixed-width hex and
//! never contains a space, so the separator is the *last* space on the
//! line; paths containing spaces round-trip. paths containing newlines are
//! rejected before a manifest is ever written (see the backup engine).

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Digest;
use crate::repo::Repository;

/// one tracked file in a revision: tree-relative path and content digest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub digest: Digest,
}

/// path to a revision's manifest file
pub fn manifest_path(repo: &Repository, revision: u64) -> PathBuf {
    repo.revisions_path().join(revision.to_string())
}

/// path to a revision's directory-list file
pub fn dir_list_path(repo: &Repository, revision: u64) -> PathBuf {
    repo.revisions_path().join(format!("{}d", revision))
}

/// whether both metadata files for a revision exist
///
/// this is the canonical "revision exists" check, cheaper than scanning
/// the index.
pub fn revision_exists(repo: &Repository, revision: u64) -> bool {
    manifest_path(repo, revision).is_file() && dir_list_path(repo, revision).is_file()
}

/// write a revision's manifest
pub fn write_manifest(repo: &Repository, revision: u64, entries: &[ManifestEntry]) -> Result<()> {
    let path = manifest_path(repo, revision);
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.path);
        out.push(' ');
        out.push_str(&entry.digest.to_hex());
        out.push('\n');
    }
    fs::write(&path, out).with_path(&path)
}

/// read a revision's manifest into (path, digest) pairs
pub fn read_manifest(repo: &Repository, revision: u64) -> Result<Vec<ManifestEntry>> {
    let path = manifest_path(repo, revision);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RevisionNotFound(revision));
        }
        Err(e) => return Err(Error::Io { path, source: e }),
    };

    let mut entries = Vec::new();
    for line in content.lines() {
        if line.is_empty() {
            continue;
        }
        let (file_path, digest_hex) = line
            .rsplit_once(' ')
            .ok_or_else(|| Error::CorruptManifest(line.to_string()))?;
        let digest = Digest::from_hex(digest_hex)
            .map_err(|_| Error::CorruptManifest(line.to_string()))?;
        entries.push(ManifestEntry {
            path: file_path.to_string(),
            digest,
        });
    }
    Ok(entries)
}

/// write a revision's directory list
pub fn write_dir_list(repo: &Repository, revision: u64, dirs: &[String]) -> Result<()> {
    let path = dir_list_path(repo, revision);
    let mut out = String::new();
    for dir in dirs {
        out.push_str(dir);
        out.push('\n');
    }
    fs::write(&path, out).with_path(&path)
}

/// read a revision's directory list
pub fn read_dir_list(repo: &Repository, revision: u64) -> Result<Vec<String>> {
    let path = dir_list_path(repo, revision);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RevisionNotFound(revision));
        }
        Err(e) => return Err(Error::Io { path, source: e }),
    };
    Ok(content
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
