//! high-level operations: backup, restore, revision listing

pub mod backup;
pub mod log;
pub mod restore;

pub use backup::{backup, BackupOutcome};
pub use log::log;
pub use restore::restore;
