//! Error types for OxiArc operations.
//!
//! This module provides the error type shared by every codec crate in the
//! workspace. It covers parameter validation, codec engine failures, protocol
//! rejections detected while streaming, and I/O errors from the byte source
//! or sink a stream adapter wraps.

use std::io;
use thiserror::Error;

/// The main error type for OxiArc operations.
#[derive(Debug, Error)]
pub enum OxiArcError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A construction-time parameter was outside the codec's supported range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the rejected parameter.
        message: String,
    },

    /// Codec state or buffers could not be allocated.
    #[error("Allocation failed: could not reserve {bytes} bytes")]
    AllocationFailed {
        /// Number of bytes that could not be reserved.
        bytes: usize,
    },

    /// A frame header declared a window larger than the configured ceiling.
    #[error(
        "Stream rejected: window size {} (window bits {window_bits}) exceeds limit of {max_window_bits} bits",
        1u64 << window_bits
    )]
    StreamRejected {
        /// Window bits declared by the frame header.
        window_bits: u32,
        /// Largest window bits the decoder accepts.
        max_window_bits: u32,
    },

    /// The decoder engine reported corrupt input or an internal error.
    #[error("Decompression failed: {message}")]
    DecompressionFailed {
        /// Diagnostic reported by the engine.
        message: String,
    },

    /// The encoder engine reported a failure.
    #[error("Compression failed: {message}")]
    CompressionFailed {
        /// Diagnostic reported by the engine.
        message: String,
    },

    /// The compressed input ended before a frame reached a valid endpoint.
    #[error("{codec} compressed stream ended prematurely")]
    PrematureEnd {
        /// Name of the codec whose stream was cut short.
        codec: &'static str,
    },
}

/// Result type alias for OxiArc operations.
pub type Result<T> = std::result::Result<T, OxiArcError>;

impl OxiArcError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an allocation failure error.
    pub fn allocation_failed(bytes: usize) -> Self {
        Self::AllocationFailed { bytes }
    }

    /// Create a stream rejection error.
    pub fn stream_rejected(window_bits: u32, max_window_bits: u32) -> Self {
        Self::StreamRejected {
            window_bits,
            max_window_bits,
        }
    }

    /// Create a decompression failure error.
    pub fn decompression_failed(message: impl Into<String>) -> Self {
        Self::DecompressionFailed {
            message: message.into(),
        }
    }

    /// Create a compression failure error.
    pub fn compression_failed(message: impl Into<String>) -> Self {
        Self::CompressionFailed {
            message: message.into(),
        }
    }

    /// Create a premature end-of-stream error.
    pub fn premature_end(codec: &'static str) -> Self {
        Self::PrematureEnd { codec }
    }

    /// Returns `true` when the error reflects the input ending mid-frame.
    pub fn is_premature_end(&self) -> bool {
        matches!(self, Self::PrematureEnd { .. })
    }
}

impl From<OxiArcError> for io::Error {
    fn from(err: OxiArcError) -> Self {
        let kind = match err {
            OxiArcError::Io(inner) => return inner,
            OxiArcError::PrematureEnd { .. } => io::ErrorKind::UnexpectedEof,
            OxiArcError::InvalidParameter { .. } => io::ErrorKind::InvalidInput,
            OxiArcError::StreamRejected { .. } | OxiArcError::DecompressionFailed { .. } => {
                io::ErrorKind::InvalidData
            }
            OxiArcError::AllocationFailed { .. } => io::ErrorKind::OutOfMemory,
            OxiArcError::CompressionFailed { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
