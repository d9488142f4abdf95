//! Storage port - abstraction for persisting sensor readings
//!
//! This trait allows the sampling loop to persist readings without knowing
//! the specific storage implementation (CSV log file, in-memory fake, etc.)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Reading;

/// Error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The filesystem refused write access
    #[error("permission denied writing {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Any other I/O failure
    #[error("failed to write {}", path.display())]
    Transient {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied { path, source },
            _ => StorageError::Transient { path, source },
        }
    }
}

/// What `ensure_header` found on disk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderStatus {
    /// The log was missing (or empty) and the header has just been written
    Created,
    /// The log already existed with content; nothing was written
    Existing,
}

/// Port for persisting sensor readings
///
/// Implementations are append-only: once the header exists it is never
/// rewritten, and every `append` leaves prior content untouched.
pub trait StoragePort {
    /// Make sure the log starts with its header
    ///
    /// Idempotent: on an existing log with content this is a no-op,
    /// whatever that content is.
    fn ensure_header(&mut self) -> Result<HeaderStatus, StorageError>;

    /// Persist one reading
    ///
    /// The record must be durable in the sense of "visible to the next
    /// process" before this returns; nothing is buffered across calls.
    fn append<T: fmt::Display>(&mut self, reading: &Reading<T>) -> Result<(), StorageError>;
}
