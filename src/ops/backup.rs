use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::digest_file;
use crate::index;
use crate::manifest::{self, ManifestEntry};
use crate::repo::{Repository, REPO_DIR_NAME};
use crate::store;

/// result of a backup run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackupOutcome {
    /// a new revision was recorded
    Created(u64),
    /// every file's content was already stored; no revision was recorded
    /// and no revision number was consumed
    NoChanges,
}

/// record a new revision of the working tree
///
/// walks the tree (pruning the repository's own directory), hashes every
/// file, and diffs the digests against the store. only never-seen content
/// is copied into the store; the manifest still lists every tracked file.
/// nothing at all is written when no new content exists, so a no-op backup
/// leaves zero filesystem side effects.
pub fn backup(repo: &Repository) -> Result<BackupOutcome> {
    let next_revision = index::revision_count(repo)? + 1;

    let (files, dirs) = walk_tree(repo.work_dir())?;

    let mut entries = Vec::with_capacity(files.len());
    for path in &files {
        let digest = digest_file(&repo.work_dir().join(path))?;
        entries.push(ManifestEntry {
            path: path.clone(),
            digest,
        });
    }

    let existing = store::list_digests(repo)?;
    let new_entries: Vec<&ManifestEntry> = entries
        .iter()
        .filter(|e| !existing.contains(&e.digest))
        .collect();

    if new_entries.is_empty() {
        debug!(revision = next_revision, "no new content, skipping revision");
        return Ok(BackupOutcome::NoChanges);
    }

    // store writes come first: a crash here leaves idempotent blobs but no
    // metadata and no index entry, so the revision simply never happened
    for entry in &new_entries {
        debug!(path = %entry.path, digest = %entry.digest, "storing new blob");
        store::put_blob(repo, &repo.work_dir().join(&entry.path), &entry.digest)?;
    }

    manifest::write_manifest(repo, next_revision, &entries)?;
    manifest::write_dir_list(repo, next_revision, &dirs)?;
    index::append_entry(repo, next_revision, &index::current_timestamp())?;

    info!(
        revision = next_revision,
        files = entries.len(),
        new_blobs = new_entries.len(),
        "recorded revision"
    );
    Ok(BackupOutcome::Created(next_revision))
}

/// collect tree-relative file and directory paths, sorted lexicographically
///
/// any directory named like the repository root is pruned, at every depth.
/// symlinks are not followed during the walk; a symlink to a file is
/// recorded by its target's content.
fn walk_tree(work_dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let walker = WalkDir::new(work_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == REPO_DIR_NAME));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(work_dir).to_path_buf();
            match e.into_io_error() {
                Some(source) => Error::Io { path, source },
                None => Error::UnsupportedPath(path),
            }
        })?;

        let rel = entry
            .path()
            .strip_prefix(work_dir)
            .map_err(|_| Error::UnsupportedPath(entry.path().to_path_buf()))?;
        let rel = rel
            .to_str()
            .ok_or_else(|| Error::UnsupportedPath(entry.path().to_path_buf()))?;
        if rel.contains('\n') || rel.contains('\r') {
            return Err(Error::UnsupportedPath(entry.path().to_path_buf()));
        }

        if entry.file_type().is_dir() {
            dirs.push(rel.to_string());
        } else {
            files.push(rel.to_string());
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_first_backup() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let outcome = backup(&repo).unwrap();
        assert_eq!(outcome, BackupOutcome::Created(1));

        // store holds exactly the sha256 of "hello"
        assert_eq!(store::blob_count(&repo).unwrap(), 1);
        let digest = crate::hash::digest_bytes(b"hello");
        assert!(store::blob_exists(&repo, &digest));

        let entries = manifest::read_manifest(&repo, 1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "a.txt");
        assert_eq!(entries[0].digest, digest);
    }

    #[test]
    fn test_backup_no_changes() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        assert_eq!(backup(&repo).unwrap(), BackupOutcome::Created(1));
        assert_eq!(backup(&repo).unwrap(), BackupOutcome::NoChanges);

        // zero side effects: no new blobs, no index entry, no metadata files
        assert_eq!(store::blob_count(&repo).unwrap(), 1);
        assert_eq!(index::revision_count(&repo).unwrap(), 1);
        assert!(!manifest::revision_exists(&repo, 2));
    }

    #[test]
    fn test_noop_backup_does_not_consume_revision_number() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        assert_eq!(backup(&repo).unwrap(), BackupOutcome::Created(1));

        assert_eq!(backup(&repo).unwrap(), BackupOutcome::NoChanges);

        fs::write(dir.path().join("a.txt"), "two").unwrap();
        assert_eq!(backup(&repo).unwrap(), BackupOutcome::Created(2));

        let numbers: Vec<u64> = index::read_entries(&repo)
            .unwrap()
            .iter()
            .map(|e| e.revision)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_identical_contents_stored_once() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "same").unwrap();
        fs::write(dir.path().join("b.txt"), "same").unwrap();
        fs::write(dir.path().join("c.txt"), "different").unwrap();

        backup(&repo).unwrap();

        // three files, two distinct contents
        assert_eq!(manifest::read_manifest(&repo, 1).unwrap().len(), 3);
        assert_eq!(store::blob_count(&repo).unwrap(), 2);
    }

    #[test]
    fn test_dedup_across_revisions() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        backup(&repo).unwrap();

        // same content reappears under a new path in a later revision
        fs::write(dir.path().join("a.txt"), "world").unwrap();
        fs::write(dir.path().join("b.txt"), "hello").unwrap();
        assert_eq!(backup(&repo).unwrap(), BackupOutcome::Created(2));

        assert_eq!(store::blob_count(&repo).unwrap(), 2);
        let entries = manifest::read_manifest(&repo, 2).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_manifest_lists_old_and_new_files() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("old.txt"), "old").unwrap();
        backup(&repo).unwrap();

        fs::write(dir.path().join("new.txt"), "new").unwrap();
        backup(&repo).unwrap();

        let paths: Vec<String> = manifest::read_manifest(&repo, 2)
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["new.txt", "old.txt"]);
    }

    #[test]
    fn test_directory_structure_recorded() {
        let (dir, repo) = test_repo();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("a/b/deep.txt"), "deep").unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();

        backup(&repo).unwrap();

        let dirs = manifest::read_dir_list(&repo, 1).unwrap();
        assert_eq!(dirs, vec!["a", "a/b", "empty"]);
    }

    #[test]
    fn test_repository_dir_excluded_from_walk() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "data").unwrap();

        backup(&repo).unwrap();

        let entries = manifest::read_manifest(&repo, 1).unwrap();
        assert!(entries.iter().all(|e| !e.path.starts_with(REPO_DIR_NAME)));
        let dirs = manifest::read_dir_list(&repo, 1).unwrap();
        assert!(dirs.iter().all(|d| !d.starts_with(REPO_DIR_NAME)));
    }

    #[test]
    fn test_backup_empty_tree_is_no_changes() {
        let (_dir, repo) = test_repo();
        assert_eq!(backup(&repo).unwrap(), BackupOutcome::NoChanges);
        assert_eq!(index::revision_count(&repo).unwrap(), 0);
    }

    #[test]
    fn test_backup_rejects_newline_in_path() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("bad\nname.txt"), "data").unwrap();

        let result = backup(&repo);
        assert!(matches!(result, Err(Error::UnsupportedPath(_))));

        // the aborted backup must leave no trace
        assert_eq!(index::revision_count(&repo).unwrap(), 0);
        assert_eq!(store::blob_count(&repo).unwrap(), 0);
        assert!(!manifest::revision_exists(&repo, 1));
    }

    #[test]
    fn test_backup_rejects_carriage_return_in_path() {
        let (dir, repo) = test_repo();
        fs::create_dir(dir.path().join("odd\rdir")).unwrap();
        fs::write(dir.path().join("ok.txt"), "data").unwrap();

        let result = backup(&repo);
        assert!(matches!(result, Err(Error::UnsupportedPath(_))));
        assert_eq!(index::revision_count(&repo).unwrap(), 0);
    }

    #[test]
    fn test_backup_path_with_spaces() {
        let (dir, repo) = test_repo();
        fs::create_dir(dir.path().join("my docs")).unwrap();
        fs::write(dir.path().join("my docs/note 1.txt"), "spaced").unwrap();

        backup(&repo).unwrap();

        let entries = manifest::read_manifest(&repo, 1).unwrap();
        assert_eq!(entries[0].path, "my docs/note 1.txt");
    }
}
