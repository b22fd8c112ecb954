//! Error types for docdelta library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docdelta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, comparing, or rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No extractor is registered for the file format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The source document could not be parsed into blocks.
    #[error("Parse error in {}: {message}", path.display())]
    Parse {
        /// Source file (empty for in-memory input)
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A nested diff (inline or table) could not be computed.
    #[error("Sub-diff error: {0}")]
    SubDiff(String),

    /// The semantic annotator failed for a change.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Error during rendering (HTML, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A report artifact could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error for the given source.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error concerns the input documents (missing, unsupported, malformed).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::NotFound(_) | Error::UnsupportedFormat(_) | Error::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound(PathBuf::from("old.txt"));
        assert_eq!(err.to_string(), "File not found: old.txt");

        let err = Error::parse("blocks.json", "expected array");
        assert_eq!(err.to_string(), "Parse error in blocks.json: expected array");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_write_error_is_not_input_error() {
        let err = Error::Write {
            path: PathBuf::from("report.html"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(!err.is_input_error());
        assert!(err.to_string().starts_with("Cannot write report.html"));
    }
}
