use std::path::PathBuf;

use crate::Digest;

/// error type for revkeep operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no repository initialised at {0}")]
    NotInitialized(PathBuf),

    #[error("repository already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("revision {0} does not exist")]
    RevisionNotFound(u64),

    #[error("blob not found in store: {0}")]
    BlobMissing(Digest),

    #[error("blob digest mismatch for {path}: manifest records {expected}, store holds {actual}")]
    DigestMismatch {
        path: String,
        expected: Digest,
        actual: Digest,
    },

    #[error("invalid digest hex: {0}")]
    InvalidDigest(String),

    #[error("path cannot be recorded in a revision: {0}")]
    UnsupportedPath(PathBuf),

    #[error("corrupt index entry: {0}")]
    CorruptIndex(String),

    #[error("corrupt manifest line: {0}")]
    CorruptManifest(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
