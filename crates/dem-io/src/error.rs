//! Error types for grid file I/O.

use std::path::{Path, PathBuf};

use dem_common::GridError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding grid files.
#[derive(Error, Debug)]
pub enum GridIoError {
    /// The file could not be opened or created.
    #[error("failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to an already opened file failed.
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already opened file failed.
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header is malformed or incomplete.
    #[error("invalid header in '{}': {message}", .path.display())]
    HeaderParse { path: PathBuf, message: String },

    /// The payload does not hold the number of cells the header declares.
    #[error("size mismatch in '{}': expected {expected} {unit}, found {actual}", .path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
        unit: &'static str,
    },

    /// A cell value could not be parsed.
    #[error("invalid cell value in '{}' at line {line}: {message}", .path.display())]
    InvalidData {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Grid container error.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl GridIoError {
    /// Create an Open error.
    pub fn open(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a Write error.
    pub fn write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a Read error.
    pub fn read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a HeaderParse error.
    pub fn header_parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::HeaderParse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a SizeMismatch error.
    pub fn size_mismatch(
        path: impl AsRef<Path>,
        expected: u64,
        actual: u64,
        unit: &'static str,
    ) -> Self {
        Self::SizeMismatch {
            path: path.as_ref().to_path_buf(),
            expected,
            actual,
            unit,
        }
    }

    /// Create an InvalidData error.
    pub fn invalid_data(path: impl AsRef<Path>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Path of the file involved, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Open { path, .. }
            | Self::Write { path, .. }
            | Self::Read { path, .. }
            | Self::HeaderParse { path, .. }
            | Self::SizeMismatch { path, .. }
            | Self::InvalidData { path, .. } => Some(path),
            Self::Config(_) | Self::Grid(_) => None,
        }
    }
}

/// Result type for grid I/O operations.
pub type Result<T> = std::result::Result<T, GridIoError>;
