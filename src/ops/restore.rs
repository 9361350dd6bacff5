use std::fs as stdfs;

use tracing::{debug, info};

use crate::error::{Error, IoResultExt, Result};
use crate::fs::{clear_dir_except, copy_file};
use crate::hash::digest_file;
use crate::index;
use crate::manifest;
use crate::repo::{Repository, REPO_DIR_NAME};
use crate::store;

/// restore the working tree to a recorded revision
///
/// with no revision given, the latest revision (the current index count)
/// is restored. the restore is destructive: everything under the working
/// directory except the repository itself is removed first.
///
/// every blob is verified against its manifest digest before the tree is
/// touched, so a corrupt or incomplete revision fails the restore while
/// the current tree is still intact.
///
/// returns the revision number that was restored.
pub fn restore(repo: &Repository, revision: Option<u64>) -> Result<u64> {
    let revision = match revision {
        Some(n) => n,
        None => index::revision_count(repo)?,
    };
    if revision == 0 || !manifest::revision_exists(repo, revision) {
        return Err(Error::RevisionNotFound(revision));
    }

    let entries = manifest::read_manifest(repo, revision)?;
    let dirs = manifest::read_dir_list(repo, revision)?;

    // integrity pass before any destructive step
    for entry in &entries {
        let blob = store::blob_path(repo, &entry.digest);
        if !blob.is_file() {
            return Err(Error::BlobMissing(entry.digest));
        }
        let actual = digest_file(&blob)?;
        if actual != entry.digest {
            return Err(Error::DigestMismatch {
                path: entry.path.clone(),
                expected: entry.digest,
                actual,
            });
        }
    }

    debug!(revision, files = entries.len(), "clearing working tree");
    clear_dir_except(repo.work_dir(), REPO_DIR_NAME)?;

    // shallow-to-deep so every directory's parent exists before it
    let mut dirs = dirs;
    dirs.sort_by_key(|d| (d.matches('/').count(), d.clone()));
    for dir in &dirs {
        let path = repo.work_dir().join(dir);
        stdfs::create_dir(&path).with_path(&path)?;
    }

    for entry in &entries {
        let blob = store::blob_path(repo, &entry.digest);
        copy_file(&blob, &repo.work_dir().join(&entry.path))?;
    }

    info!(revision, files = entries.len(), "restored working tree");
    Ok(revision)
}
