//! content-addressable blob store
//!
//! a single flat directory whose entries are named by the hex digest of
//! their contents. append-only: an existing entry is never rewritten, so a
//! completed revision can never be corrupted by a later backup.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};
use crate::hash::Digest;
use crate::repo::Repository;

/// suffix for in-flight store writes, skipped when listing digests
const TMP_SUFFIX: &str = ".tmp";

/// get the filesystem path to a blob
pub fn blob_path(repo: &Repository, digest: &Digest) -> PathBuf {
    repo.store_path().join(digest.to_hex())
}

/// check if a blob exists in the store
pub fn blob_exists(repo: &Repository, digest: &Digest) -> bool {
    blob_path(repo, digest).is_file()
}

/// copy a source file into the store under its digest
///
/// writes to a temporary name first and renames into place, so a killed
/// process leaves at worst an orphaned temp file, never a truncated blob.
/// a no-op if the entry already exists.
pub fn put_blob(repo: &Repository, source: &Path, digest: &Digest) -> Result<()> {
    let dest = blob_path(repo, digest);
    if dest.exists() {
        return Ok(());
    }

    let tmp = repo.store_path().join(format!("{}{}", digest.to_hex(), TMP_SUFFIX));
    fs::copy(source, &tmp).with_path(source)?;
    fs::rename(&tmp, &dest).with_path(&dest)?;
    Ok(())
}

/// the set of every digest currently stored
///
/// this is the dedup membership set: one flat directory listing answers
/// "has this exact content ever been stored, in any revision".
pub fn list_digests(repo: &Repository) -> Result<HashSet<Digest>> {
    let dir = repo.store_path();
    let mut digests = HashSet::new();
    for entry in fs::read_dir(&dir).with_path(&dir)? {
        let entry = entry.with_path(&dir)?;
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(n) => n,
            None => continue,
        };
        if name.ends_with(TMP_SUFFIX) {
            continue;
        }
        if let Ok(digest) = Digest::from_hex(name) {
            digests.insert(digest);
        }
    }
    Ok(digests)
}

/// number of distinct blobs in the store
pub fn blob_count(repo: &Repository) -> Result<usize> {
    Ok(list_digests(repo)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest_file;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_put_and_lookup_blob() {
        let (dir, repo) = test_repo();
        let source = dir.path().join("a.txt");
        fs::write(&source, "hello").unwrap();
        let digest = digest_file(&source).unwrap();

        assert!(!blob_exists(&repo, &digest));
        put_blob(&repo, &source, &digest).unwrap();
        assert!(blob_exists(&repo, &digest));

        let stored = fs::read_to_string(blob_path(&repo, &digest)).unwrap();
        assert_eq!(stored, "hello");
    }

    #[test]
    fn test_put_blob_idempotent() {
        let (dir, repo) = test_repo();
        let source = dir.path().join("a.txt");
        fs::write(&source, "content").unwrap();
        let digest = digest_file(&source).unwrap();

        put_blob(&repo, &source, &digest).unwrap();

        // second put with different source bytes must not touch the entry
        fs::write(&source, "tampered").unwrap();
        put_blob(&repo, &source, &digest).unwrap();

        let stored = fs::read_to_string(blob_path(&repo, &digest)).unwrap();
        assert_eq!(stored, "content");
        assert_eq!(blob_count(&repo).unwrap(), 1);
    }

    #[test]
    fn test_put_blob_unreadable_source_names_source_path() {
        let (dir, repo) = test_repo();
        let missing = dir.path().join("never-written");
        let digest = crate::hash::digest_bytes(b"whatever");

        match put_blob(&repo, &missing, &digest) {
            Err(crate::Error::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected io error for source path, got {:?}", other),
        }
    }

    #[test]
    fn test_list_digests() {
        let (dir, repo) = test_repo();
        for (name, content) in [("a", "one"), ("b", "two")] {
            let source = dir.path().join(name);
            fs::write(&source, content).unwrap();
            let digest = digest_file(&source).unwrap();
            put_blob(&repo, &source, &digest).unwrap();
        }

        let digests = list_digests(&repo).unwrap();
        assert_eq!(digests.len(), 2);
    }

    #[test]
    fn test_list_digests_skips_temp_files() {
        let (_dir, repo) = test_repo();
        fs::write(repo.store_path().join("deadbeef.tmp"), "partial").unwrap();

        assert!(list_digests(&repo).unwrap().is_empty());
        assert_eq!(blob_count(&repo).unwrap(), 0);
    }
}
