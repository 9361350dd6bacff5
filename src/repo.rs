use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};

/// name of the repository directory inside the working tree
pub const REPO_DIR_NAME: &str = ".revkeep";

/// identity marker on the first line of the index file, proving the
/// directory layout matches what this tool expects
pub const IDENTITY_LINE: &str = "REVKEEP INDEX FILE";

/// a revkeep repository rooted inside a working directory
///
/// this is a stateless value object: every query re-derives its answer from
/// the files on disk, so nothing can go stale between operations.
pub struct Repository {
    work_dir: PathBuf,
}

impl Repository {
    /// bind to a working directory without checking repository state
    pub fn at(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// initialize a new repository under the working directory
    ///
    /// a leftover directory that is not a valid repository is replaced
    /// whole; a valid repository is never reinitialised.
    pub fn init(work_dir: &Path) -> Result<Self> {
        let repo = Self::at(work_dir);
        if repo.is_initialized() {
            return Err(Error::AlreadyInitialized(repo.root()));
        }

        let root = repo.root();
        if root.exists() {
            fs::remove_dir_all(&root).with_path(&root)?;
        }
        fs::create_dir(&root).with_path(&root)?;
        fs::create_dir(repo.store_path()).with_path(repo.store_path())?;
        fs::create_dir(repo.revisions_path()).with_path(repo.revisions_path())?;
        fs::write(repo.index_path(), format!("{}\n", IDENTITY_LINE))
            .with_path(repo.index_path())?;

        Ok(repo)
    }

    /// open an existing repository
    pub fn open(work_dir: &Path) -> Result<Self> {
        let repo = Self::at(work_dir);
        if !repo.is_initialized() {
            return Err(Error::NotInitialized(repo.root()));
        }
        Ok(repo)
    }

    /// whether a valid repository exists: both required subdirectories are
    /// present and the index carries the identity marker
    pub fn is_initialized(&self) -> bool {
        if !self.store_path().is_dir() || !self.revisions_path().is_dir() {
            return false;
        }
        let file = match File::open(self.index_path()) {
            Ok(f) => f,
            Err(_) => return false,
        };
        let mut first_line = String::new();
        if BufReader::new(file).read_line(&mut first_line).is_err() {
            return false;
        }
        first_line.trim_end_matches('\n') == IDENTITY_LINE
    }

    /// recursively remove the repository and every revision it holds
    pub fn destroy(self) -> Result<()> {
        let root = self.root();
        if !root.exists() {
            return Err(Error::NotInitialized(root));
        }
        fs::remove_dir_all(&root).with_path(&root)
    }

    /// the working directory this repository snapshots
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// repository root directory inside the working tree
    pub fn root(&self) -> PathBuf {
        self.work_dir.join(REPO_DIR_NAME)
    }

    /// path to the index file
    pub fn index_path(&self) -> PathBuf {
        self.root().join("index")
    }

    /// path to the content-addressable store directory
    pub fn store_path(&self) -> PathBuf {
        self.root().join("files")
    }

    /// path to the per-revision metadata directory
    pub fn revisions_path(&self) -> PathBuf {
        self.root().join("revisions")
    }
}
