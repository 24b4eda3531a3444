//! Encoder and decoder parameters.

use oxiarc_core::error::{OxiArcError, Result};

use crate::{
    BROTLI_MAX_QUALITY, BROTLI_MAX_WINDOW_BITS, BROTLI_MIN_QUALITY, BROTLI_MIN_WINDOW_BITS,
    DEFAULT_DECODER_WINDOW_BITS, DEFAULT_QUALITY, DEFAULT_WINDOW_BITS,
};

/// Level value that selects [`DEFAULT_QUALITY`], following zlib's `-1` convention.
pub const DEFAULT_LEVEL: i32 = -1;

/// Validated parameters for a Brotli encoder.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::EncoderParams;
///
/// let params = EncoderParams::new(5, Some(20)).unwrap();
/// assert_eq!(params.quality(), 5);
/// assert_eq!(params.window_bits(), 20);
///
/// assert!(EncoderParams::new(12, None).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderParams {
    quality: u32,
    window_bits: u32,
}

impl EncoderParams {
    /// Create encoder parameters from a compression level and optional window bits.
    ///
    /// A `level` of [`DEFAULT_LEVEL`] selects [`DEFAULT_QUALITY`]; a missing
    /// `window_bits` selects [`DEFAULT_WINDOW_BITS`].
    pub fn new(level: i32, window_bits: Option<u32>) -> Result<Self> {
        let quality = if level == DEFAULT_LEVEL {
            DEFAULT_QUALITY
        } else {
            check_quality(level)?
        };
        let window_bits = check_window_bits(window_bits.unwrap_or(DEFAULT_WINDOW_BITS))?;
        Ok(Self {
            quality,
            window_bits,
        })
    }

    /// Return a copy with a different quality (0-11).
    pub fn with_quality(self, quality: u32) -> Result<Self> {
        let quality = check_quality(i64::from(quality))?;
        Ok(Self { quality, ..self })
    }

    /// Return a copy with a different window size (10-24 bits).
    pub fn with_window_bits(self, window_bits: u32) -> Result<Self> {
        let window_bits = check_window_bits(window_bits)?;
        Ok(Self {
            window_bits,
            ..self
        })
    }

    /// Get the encoder quality.
    pub fn quality(&self) -> u32 {
        self.quality
    }

    /// Get the window bits written into each frame header.
    pub fn window_bits(&self) -> u32 {
        self.window_bits
    }
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            window_bits: DEFAULT_WINDOW_BITS,
        }
    }
}

/// Validated parameters for a Brotli decoder.
///
/// The window bits act as an acceptance ceiling: frames declaring a larger
/// window are rejected before decoding starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderParams {
    window_bits: u32,
}

impl DecoderParams {
    /// Create decoder parameters; a missing ceiling selects [`DEFAULT_DECODER_WINDOW_BITS`].
    pub fn new(window_bits: Option<u32>) -> Result<Self> {
        let window_bits = check_window_bits(window_bits.unwrap_or(DEFAULT_DECODER_WINDOW_BITS))?;
        Ok(Self { window_bits })
    }

    /// Return a copy with a different acceptance ceiling.
    pub fn with_window_bits(self, window_bits: u32) -> Result<Self> {
        Self::new(Some(window_bits))
    }

    /// Get the largest window bits a frame may declare.
    pub fn window_bits(&self) -> u32 {
        self.window_bits
    }
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            window_bits: DEFAULT_DECODER_WINDOW_BITS,
        }
    }
}

fn check_quality(level: impl Into<i64>) -> Result<u32> {
    let level = level.into();
    if level < i64::from(BROTLI_MIN_QUALITY) || level > i64::from(BROTLI_MAX_QUALITY) {
        return Err(OxiArcError::invalid_parameter(format!(
            "invalid brotli compression level {level} (expected {BROTLI_MIN_QUALITY}-{BROTLI_MAX_QUALITY})"
        )));
    }
    Ok(level as u32)
}

fn check_window_bits(window_bits: u32) -> Result<u32> {
    if !(BROTLI_MIN_WINDOW_BITS..=BROTLI_MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(OxiArcError::invalid_parameter(format!(
            "invalid brotli window size (window bits {window_bits})"
        )));
    }
    Ok(window_bits)
}
