//! revkeep - content-addressed directory snapshots
//!
//! a local, directory-scoped snapshot tool: it records point-in-time
//! revisions of a working directory tree under a hidden `.revkeep`
//! directory inside that tree, and can restore the tree to any prior
//! revision exactly.
//!
//! # Core concepts
//!
//! - **Blob**: one file's content, stored once in a flat store keyed by
//!   its SHA-256 digest. identical contents anywhere in any revision share
//!   a single blob.
//! - **Manifest**: a complete per-revision listing of tree-relative path
//!   to digest pairs, persisted as plain text.
//! - **Directory list**: the set of directories a revision's tree shape
//!   needs, recorded separately because empty directories carry no files.
//! - **Index**: an append-only ledger of `(revision, timestamp)` entries;
//!   the revision count is always derived from it, never cached.
//!
//! revisions are numbered densely from 1. a backup that finds no new
//! content reports [`ops::BackupOutcome::NoChanges`] and writes nothing,
//! so no revision number is ever consumed by a no-op.
//!
//! operations are synchronous and single-process; concurrent invocation
//! against one repository from several processes is not supported.
//!
//! # Example usage
//!
//! ```no_run
//! use revkeep::{ops, Repository};
//! use std::path::Path;
//!
//! let repo = Repository::init(Path::new("/path/to/project")).unwrap();
//!
//! // record a revision
//! let outcome = ops::backup(&repo).unwrap();
//!
//! // restore the latest revision
//! ops::restore(&repo, None).unwrap();
//! ```

mod error;
mod hash;
mod index;
mod manifest;
mod repo;
mod store;

pub mod fs;
pub mod ops;

pub use error::{Error, IoResultExt, Result};
pub use hash::{digest_bytes, digest_file, Digest};
pub use index::{read_entries, revision_count, IndexEntry};
pub use manifest::{read_dir_list, read_manifest, revision_exists, ManifestEntry};
pub use repo::{Repository, IDENTITY_LINE, REPO_DIR_NAME};
pub use store::{blob_count, blob_exists, blob_path, list_digests, put_blob};
