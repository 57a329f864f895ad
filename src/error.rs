//! Error types for the shp-tools-rs library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shapefile operations
#[derive(Debug, Error)]
pub enum ShpError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File code in the 100-byte header is not 9994
    #[error("File code mismatch in {path:?}: expected 9994, got {actual}")]
    FileCodeMismatch { path: PathBuf, actual: i32 },

    /// Read or seek past the end of the stream
    #[error("End of stream in {path:?}: offset {offset}, file length {file_length}")]
    EndOfStream {
        path: PathBuf,
        offset: u64,
        file_length: u64,
    },

    /// Invalid argument rejected at the API boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Shape type tag not part of the closed on-disk tag set
    #[error("Unsupported shape type: {0}")]
    UnsupportedShapeType(i32),

    /// Record content length disagrees with the actual payload size
    #[error("Content length mismatch in record {record}: declared {declared} words, payload implies at least {required} words")]
    ContentLengthMismatch {
        record: usize,
        declared: i32,
        required: i32,
    },

    /// Attribute value does not fit the fixed-width dBase numeric field
    #[error("Number {value} out of representable range for width {width}, {decimals} decimals")]
    NumberOutOfRange {
        value: f64,
        width: u8,
        decimals: u8,
    },

    /// Error parsing a textual representation (e.g. an extent string)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid file structure
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// Operation cancelled through the progress sink
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for shapefile operations
pub type Result<T> = std::result::Result<T, ShpError>;

impl From<String> for ShpError {
    fn from(s: String) -> Self {
        ShpError::Custom(s)
    }
}

impl From<&str> for ShpError {
    fn from(s: &str) -> Self {
        ShpError::Custom(s.to_string())
    }
}
