//! Single-step Brotli codec sessions.
//!
//! A [`CodecSession`] owns exactly one engine, either an encoder or a decoder,
//! plus a fixed scratch buffer. Each call to [`CodecSession::pump_once`]
//! consumes what it can from the caller's input view and returns at most one
//! buffer's worth of output.

use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::traits::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
};
use tracing::trace;

use crate::engine::EncoderEngine;
use crate::frame::{FrameDecoder, FrameStatus};
use crate::params::{DecoderParams, EncoderParams};
use crate::{BUFFER_SIZE, alloc_buffer};

enum SessionMode {
    Encoder {
        engine: EncoderEngine,
        params: EncoderParams,
    },
    Decoder {
        frame: FrameDecoder,
        params: DecoderParams,
    },
}

/// A Brotli encoder or decoder driven one pump at a time.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::CodecSession;
/// use oxiarc_core::FlushMode;
///
/// let mut encoder = CodecSession::compressor(-1, None).unwrap();
/// let mut input: &[u8] = b"pump me";
/// let mut compressed = Vec::new();
/// loop {
///     let (more, chunk) = encoder.pump_once(&mut input, FlushMode::Finish).unwrap();
///     compressed.extend_from_slice(chunk);
///     if !more && encoder.is_finished() {
///         break;
///     }
/// }
///
/// let mut decoder = CodecSession::decompressor(None).unwrap();
/// let mut input = &compressed[..];
/// let (more, plain) = decoder.pump_once(&mut input, FlushMode::None).unwrap();
/// assert!(!more);
/// assert_eq!(plain, b"pump me");
/// assert!(decoder.at_endpoint());
/// ```
pub struct CodecSession {
    mode: SessionMode,
    buffer: Box<[u8]>,
}

impl CodecSession {
    /// Create a compressing session.
    ///
    /// `level` -1 selects the default quality; `window_bits` defaults to 19.
    pub fn compressor(level: i32, window_bits: Option<u32>) -> Result<Self> {
        Self::with_encoder_params(EncoderParams::new(level, window_bits)?)
    }

    /// Create a decompressing session accepting windows up to `window_bits` (default 22).
    pub fn decompressor(window_bits: Option<u32>) -> Result<Self> {
        Self::with_decoder_params(DecoderParams::new(window_bits)?)
    }

    /// Create a compressing session from validated parameters.
    pub fn with_encoder_params(params: EncoderParams) -> Result<Self> {
        let buffer = alloc_buffer(BUFFER_SIZE)?;
        trace!(
            target: "oxiarc::brotli",
            quality = params.quality(),
            window_bits = params.window_bits(),
            "created brotli encoder session"
        );
        Ok(Self {
            mode: SessionMode::Encoder {
                engine: EncoderEngine::new(&params),
                params,
            },
            buffer,
        })
    }

    /// Create a decompressing session from validated parameters.
    pub fn with_decoder_params(params: DecoderParams) -> Result<Self> {
        let buffer = alloc_buffer(BUFFER_SIZE)?;
        trace!(
            target: "oxiarc::brotli",
            max_window_bits = params.window_bits(),
            "created brotli decoder session"
        );
        Ok(Self {
            mode: SessionMode::Decoder {
                frame: FrameDecoder::new(&params),
                params,
            },
            buffer,
        })
    }

    /// Run the engine once over `input`, advancing it past the consumed bytes.
    ///
    /// Returns whether the engine still holds output (call again, possibly
    /// with empty input, to drain it) together with the bytes produced by
    /// this call. `flush` only applies to compressing sessions.
    ///
    /// A decompressing session rejects frames whose header declares a window
    /// above its ceiling, and treats input following a completed frame as the
    /// start of the next frame.
    pub fn pump_once(&mut self, input: &mut &[u8], flush: FlushMode) -> Result<(bool, &[u8])> {
        let produced = match &mut self.mode {
            SessionMode::Encoder { engine, .. } => {
                let (consumed, produced) = engine.compress(input, &mut self.buffer, flush)?;
                *input = &input[consumed..];
                produced
            }
            SessionMode::Decoder { frame, .. } => frame.decode(input, &mut self.buffer)?.0,
        };
        Ok((self.has_more_output(), &self.buffer[..produced]))
    }

    /// Whether the engine holds output awaiting another pump.
    pub fn has_more_output(&self) -> bool {
        match &self.mode {
            SessionMode::Encoder { engine, .. } => engine.has_more_output(),
            SessionMode::Decoder { frame, .. } => frame.has_pending_output(),
        }
    }

    /// Whether this session compresses.
    pub fn is_compressing(&self) -> bool {
        matches!(self.mode, SessionMode::Encoder { .. })
    }

    /// Whether the last pump completed a frame cleanly (always false when compressing).
    pub fn at_endpoint(&self) -> bool {
        match &self.mode {
            SessionMode::Encoder { .. } => false,
            SessionMode::Decoder { frame, .. } => frame.at_endpoint(),
        }
    }

    /// Whether the stream is complete.
    ///
    /// For an encoder, the stream was finished and all output drained; for a
    /// decoder, the last frame ended cleanly.
    pub fn is_finished(&self) -> bool {
        match &self.mode {
            SessionMode::Encoder { engine, .. } => engine.is_finished(),
            SessionMode::Decoder { frame, .. } => frame.at_endpoint(),
        }
    }

    /// Window bits written by the encoder, or the decoder's acceptance ceiling.
    pub fn window_bits(&self) -> u32 {
        match &self.mode {
            SessionMode::Encoder { params, .. } => params.window_bits(),
            SessionMode::Decoder { frame, .. } => frame.max_window_bits(),
        }
    }

    /// Discard all stream state, keeping the session's parameters.
    pub fn reset(&mut self) {
        match &mut self.mode {
            SessionMode::Encoder { engine, params } => *engine = EncoderEngine::new(params),
            SessionMode::Decoder { frame, .. } => frame.reset(),
        }
    }
}

impl std::fmt::Debug for CodecSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mode {
            SessionMode::Encoder { params, .. } => f
                .debug_struct("CodecSession")
                .field("mode", &"compress")
                .field("params", params)
                .finish(),
            SessionMode::Decoder { params, .. } => f
                .debug_struct("CodecSession")
                .field("mode", &"decompress")
                .field("params", params)
                .finish(),
        }
    }
}

impl Compressor for CodecSession {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        let SessionMode::Encoder { engine, .. } = &mut self.mode else {
            return Err(OxiArcError::invalid_parameter(
                "brotli session was created for decompression",
            ));
        };

        let (consumed, produced) = engine.compress(input, output, flush)?;
        let status = if engine.is_finished() {
            CompressStatus::Done
        } else if engine.has_more_output() || consumed < input.len() {
            CompressStatus::NeedsOutput
        } else {
            CompressStatus::NeedsInput
        };
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        CodecSession::reset(self);
    }

    fn is_finished(&self) -> bool {
        CodecSession::is_finished(self)
    }
}

impl Decompressor for CodecSession {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let SessionMode::Decoder { frame, .. } = &mut self.mode else {
            return Err(OxiArcError::invalid_parameter(
                "brotli session was created for compression",
            ));
        };

        let mut remaining = input;
        let (produced, status) = frame.decode(&mut remaining, output)?;
        let status = match status {
            FrameStatus::NeedsInput => DecompressStatus::NeedsInput,
            FrameStatus::NeedsOutput => DecompressStatus::NeedsOutput,
            FrameStatus::FrameEnd => DecompressStatus::FrameEnd,
            FrameStatus::Finished => DecompressStatus::Done,
        };
        Ok((input.len() - remaining.len(), produced, status))
    }

    fn reset(&mut self) {
        CodecSession::reset(self);
    }

    fn is_finished(&self) -> bool {
        CodecSession::is_finished(self)
    }
}
