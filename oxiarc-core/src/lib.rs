//! # OxiArc Core
//!
//! Core components shared by the OxiArc codec crates.
//!
//! - [`traits`]: Chunked streaming interface for compression/decompression
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! Codec crates sit on top of this one and adapt an engine to byte streams:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Stream adapters                                         │
//! │     Read/Write and AsyncRead/AsyncWrite wrappers        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec sessions                                          │
//! │     Brotli encoder/decoder sessions                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     Compressor/Decompressor traits, OxiArcError         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiarc_core::{FlushMode, OxiArcError};
//!
//! assert_eq!(FlushMode::default(), FlushMode::None);
//!
//! let err = OxiArcError::premature_end("brotli");
//! assert!(err.is_premature_end());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

// Re-exports for convenience
pub use error::{OxiArcError, Result};
pub use traits::{CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{OxiArcError, Result};
    pub use crate::traits::{Compressor, Decompressor, FlushMode};
}
