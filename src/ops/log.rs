use std::fmt;

use crate::error::Result;
use crate::index::{self, IndexEntry};
use crate::repo::Repository;

/// list every recorded revision, oldest first
pub fn log(repo: &Repository) -> Result<Vec<IndexEntry>> {
    index::read_entries(repo)
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "revision {}  {}", self.revision, self.timestamp)
    }
}
