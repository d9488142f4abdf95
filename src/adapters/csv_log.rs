//! CSV log file storage adapter
//!
//! This adapter implements the StoragePort trait on top of a plain
//! append-only CSV file. Every append is a fresh open/write/close, so a
//! killed process never leaves a half-buffered record behind.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::domain::Reading;
use crate::ports::storage::{HeaderStatus, StorageError, StoragePort};

/// First line of every log file
pub const CSV_HEADER: &str = "timestamp,temperature,humidity,pressure";

/// Append-only CSV log
pub struct CsvLogFile {
    path: PathBuf,
}

impl CsvLogFile {
    /// Create an adapter for the log at `path`
    ///
    /// Nothing is touched on disk until `ensure_header()` or `append()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&self, mut file: File) -> io::Result<()> {
        file.write_all(format!("{CSV_HEADER}\n").as_bytes())?;
        file.flush()
    }
}

/// Render one record line, newline included
///
/// Floats use the round-trippable `Debug` form so whole numbers keep their
/// trailing `.0`.
pub fn format_record<T: fmt::Display>(reading: &Reading<T>) -> String {
    format!(
        "{},{:?},{:?},{:?}\n",
        reading.timestamp, reading.temperature, reading.humidity, reading.pressure
    )
}

impl StoragePort for CsvLogFile {
    fn ensure_header(&mut self) -> Result<HeaderStatus, StorageError> {
        let err = |e| StorageError::from_io(&self.path, e);

        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => {
                info!(
                    "Log file does not exist. Creating {} and writing header",
                    self.path.display()
                );
                self.write_header(file).map_err(err)?;
                Ok(HeaderStatus::Created)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let len = std::fs::metadata(&self.path).map_err(err)?.len();
                if len > 0 {
                    return Ok(HeaderStatus::Existing);
                }

                info!("Log file {} is empty, writing header", self.path.display());
                let file = OpenOptions::new().append(true).open(&self.path).map_err(err)?;
                self.write_header(file).map_err(err)?;
                Ok(HeaderStatus::Created)
            }
            Err(e) => Err(err(e)),
        }
    }

    fn append<T: fmt::Display>(&mut self, reading: &Reading<T>) -> Result<(), StorageError> {
        let err = |e| StorageError::from_io(&self.path, e);

        // no `create`: a log that vanished mid-run must not come back headerless
        let mut file = OpenOptions::new().append(true).open(&self.path).map_err(err)?;
        file.write_all(format_record(reading).as_bytes()).map_err(err)?;
        file.flush().map_err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_format_record() {
        let reading = Reading::new(15, 20.2, 45.0, 1012.4);
        assert_eq!(format_record(&reading), "15,20.2,45.0,1012.4\n");
    }

    #[test]
    fn test_ensure_header_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut log = CsvLogFile::new(&path);

        assert_eq!(log.ensure_header().unwrap(), HeaderStatus::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_ensure_header_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut log = CsvLogFile::new(&path);

        log.ensure_header().unwrap();
        assert_eq!(log.ensure_header().unwrap(), HeaderStatus::Existing);
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_ensure_header_trusts_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "something else\n").unwrap();

        let mut log = CsvLogFile::new(&path);
        assert_eq!(log.ensure_header().unwrap(), HeaderStatus::Existing);
        assert_eq!(fs::read_to_string(&path).unwrap(), "something else\n");
    }

    #[test]
    fn test_ensure_header_fills_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        File::create(&path).unwrap();

        let mut log = CsvLogFile::new(&path);
        assert_eq!(log.ensure_header().unwrap(), HeaderStatus::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_append_keeps_prior_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut log = CsvLogFile::new(&path);

        log.ensure_header().unwrap();
        log.append(&Reading::new(0, 20.1, 45.0, 1012.3)).unwrap();
        log.append(&Reading::new(15, 20.2, 45.1, 1012.4)).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "timestamp,temperature,humidity,pressure\n0,20.1,45.0,1012.3\n15,20.2,45.1,1012.4\n"
        );
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.csv");
        let mut log = CsvLogFile::new(&path);

        let err = log.append(&Reading::new(0, 20.1, 45.0, 1012.3)).unwrap_err();
        assert!(matches!(err, StorageError::Transient { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/log.csv");
        let mut log = CsvLogFile::new(&path);

        assert!(log.ensure_header().is_err());
    }
}
