//! Error types for OxiLZP operations.
//!
//! This module provides the error type shared by the codec and its container
//! layer: I/O failures, header and option validation errors, and the single
//! guard the decoder raises when a payload is damaged badly enough to leave
//! the active frequency table.

use std::io;
use thiserror::Error;

/// The main error type for OxiLZP operations.
#[derive(Debug, Error)]
pub enum OxiLzpError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in stream header.
    #[error("Invalid magic number: expected {expected:#018x}, found {found:#018x}")]
    InvalidMagic {
        /// Expected magic value.
        expected: u64,
        /// Actual value found in the stream.
        found: u64,
    },

    /// Unexpected end of input while reading a fixed-size field.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Packed options read from a stream failed validation.
    #[error("Invalid compression options: {packed:#018x}")]
    InvalidOptions {
        /// The packed options word as read from the stream.
        packed: u64,
    },

    /// Caller-supplied options failed validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the violated constraint.
        message: String,
    },

    /// Progress interval must be positive.
    #[error("Invalid interval length: {interval} (must be positive)")]
    InvalidInterval {
        /// The rejected interval.
        interval: u64,
    },

    /// Corrupted payload detected by the decoder.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Number of compressed payload bytes consumed when the corruption
        /// was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for OxiLZP operations.
pub type Result<T> = std::result::Result<T, OxiLzpError>;

impl OxiLzpError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: u64, found: u64) -> Self {
        Self::InvalidMagic { expected, found }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid options error.
    pub fn invalid_options(packed: u64) -> Self {
        Self::InvalidOptions { packed }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an invalid interval error.
    pub fn invalid_interval(interval: u64) -> Self {
        Self::InvalidInterval { interval }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiLzpError::invalid_magic(0x208b_bb9f_5b12_98be, 0);
        let text = err.to_string();
        assert!(text.contains("Invalid magic"));
        assert!(text.contains("0x208bbb9f5b1298be"));

        let err = OxiLzpError::unexpected_eof(3);
        assert!(err.to_string().contains("3 more bytes"));

        let err = OxiLzpError::invalid_configuration("ppm order out of range");
        assert!(err.to_string().contains("ppm order"));

        let err = OxiLzpError::invalid_interval(0);
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OxiLzpError = io_err.into();
        assert!(matches!(err, OxiLzpError::Io(_)));
    }
}
