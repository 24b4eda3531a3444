//! # OxiArc Brotli
//!
//! Streaming Brotli (RFC 7932) compression and decompression with a bounded
//! decoder window.
//!
//! Every decompression path refuses frames whose header declares a sliding
//! window larger than a configurable ceiling (22 bits, 4 MiB, by default), so
//! untrusted input cannot make the decoder allocate up to 16 MiB per frame.
//! Input continuing after a completed frame is decoded as a further frame.
//!
//! ## Layers
//!
//! ```text
//! compress / decompress            one-shot helpers
//! BrotliReader / AsyncBrotliReader pull decompressed bytes from a source
//! BrotliWriter / AsyncBrotliWriter push bytes through to a sink
//! CodecSession                     one engine step per call
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiarc_brotli::{DecoderParams, compress, decompress_with};
//!
//! let compressed = compress(b"Hello, bounded Brotli!").unwrap();
//! let params = DecoderParams::new(Some(20)).unwrap();
//! let plain = decompress_with(&compressed, params).unwrap();
//! assert_eq!(plain, b"Hello, bounded Brotli!");
//! ```
//!
//! ## Feature Flags
//!
//! - `async-io` (default): [`AsyncBrotliReader`] and [`AsyncBrotliWriter`] on tokio.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod frame;
pub mod params;
pub mod read;
pub mod session;
mod stream;
pub mod window;
pub mod write;

#[cfg(feature = "async-io")]
pub mod async_read;
#[cfg(feature = "async-io")]
pub mod async_write;

#[cfg(feature = "async-io")]
pub use async_read::AsyncBrotliReader;
#[cfg(feature = "async-io")]
pub use async_write::AsyncBrotliWriter;
pub use params::{DEFAULT_LEVEL, DecoderParams, EncoderParams};
pub use read::BrotliReader;
pub use session::CodecSession;
pub use window::{LARGE_WINDOW_SENTINEL, inspect_window_bits};
pub use write::BrotliWriter;

use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::traits::Compressor;

/// Lowest encoder quality.
pub const BROTLI_MIN_QUALITY: u32 = 0;
/// Highest encoder quality.
pub const BROTLI_MAX_QUALITY: u32 = 11;
/// Smallest window exponent a frame may declare.
pub const BROTLI_MIN_WINDOW_BITS: u32 = 10;
/// Largest window exponent of a standard frame.
pub const BROTLI_MAX_WINDOW_BITS: u32 = 24;

/// Encoder quality used when none is requested.
pub const DEFAULT_QUALITY: u32 = 11;
/// Window exponent written by the encoder when none is requested.
pub const DEFAULT_WINDOW_BITS: u32 = 19;
/// Decoder window ceiling used when none is requested.
pub const DEFAULT_DECODER_WINDOW_BITS: u32 = 22;

/// Size of the scratch buffers owned by sessions, readers and writers.
pub const BUFFER_SIZE: usize = 8192;

/// Allocate a zeroed scratch buffer, reporting failure instead of aborting.
pub(crate) fn alloc_buffer(size: usize) -> Result<Box<[u8]>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| OxiArcError::allocation_failed(size))?;
    buffer.resize(size, 0);
    Ok(buffer.into_boxed_slice())
}

/// Compress `data` with the default quality and window.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with(data, EncoderParams::default())
}

/// Compress `data` into a single Brotli frame.
pub fn compress_with(data: &[u8], params: EncoderParams) -> Result<Vec<u8>> {
    let mut session = CodecSession::with_encoder_params(params)?;
    session.compress_all(data)
}

/// Decompress a Brotli stream, accepting windows up to the default ceiling.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with(data, DecoderParams::default())
}

/// Decompress every frame in `data`.
///
/// # Errors
///
/// Fails with [`OxiArcError::PrematureEnd`] when `data` is empty or ends in
/// the middle of a frame, and with [`OxiArcError::StreamRejected`] when a
/// frame declares a window above `params`' ceiling.
pub fn decompress_with(data: &[u8], params: DecoderParams) -> Result<Vec<u8>> {
    let mut reader = BrotliReader::with_params(data, params)?;
    let mut output = Vec::with_capacity(data.len().saturating_mul(3));
    let mut chunk = alloc_buffer(BUFFER_SIZE)?;
    loop {
        let n = reader.try_read(&mut chunk, 1)?;
        if n == 0 {
            return Ok(output);
        }
        output.extend_from_slice(&chunk[..n]);
    }
}
