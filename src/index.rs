//! append-only revision index
//!
//! a single text file: the first line is the repository identity marker,
//! each following line is `<revision>;<timestamp>`. the revision count is
//! always derived by counting entries, never cached, so it cannot drift
//! from what was actually appended.

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::error::{Error, IoResultExt, Result};
use crate::repo::{Repository, IDENTITY_LINE};

/// one ledger entry: revision number and the time it was taken
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub revision: u64,
    pub timestamp: String,
}

/// produce the timestamp text recorded for a new revision
pub fn current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// append a revision entry to the index
pub fn append_entry(repo: &Repository, revision: u64, timestamp: &str) -> Result<()> {
    let path = repo.index_path();
    let mut file = OpenOptions::new()
        .append(true)
        .open(&path)
        .with_path(&path)?;
    writeln!(file, "{};{}", revision, timestamp).with_path(&path)?;
    Ok(())
}

/// read all revision entries in index order
pub fn read_entries(repo: &Repository) -> Result<Vec<IndexEntry>> {
    let path = repo.index_path();
    let content = fs::read_to_string(&path).with_path(&path)?;
    let mut lines = content.lines();

    match lines.next() {
        Some(first) if first == IDENTITY_LINE => {}
        other => {
            return Err(Error::CorruptIndex(other.unwrap_or("").to_string()));
        }
    }

    let mut entries = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (number, timestamp) = line
            .split_once(';')
            .ok_or_else(|| Error::CorruptIndex(line.to_string()))?;
        let revision = number
            .parse::<u64>()
            .map_err(|_| Error::CorruptIndex(line.to_string()))?;
        entries.push(IndexEntry {
            revision,
            timestamp: timestamp.to_string(),
        });
    }
    Ok(entries)
}

/// how many revisions exist
pub fn revision_count(repo: &Repository) -> Result<u64> {
    Ok(read_entries(repo)?.len() as u64)
}
