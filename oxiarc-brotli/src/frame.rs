//! Per-frame decoding policy shared by every decompression path.
//!
//! A Brotli byte stream may carry several complete frames back to back. The
//! engine has no reset operation and stops at the first end marker, so the
//! frame decoder replaces it with a fresh instance whenever input follows a
//! completed frame, and re-arms the window check for the new frame header.

use oxiarc_core::error::{OxiArcError, Result};
use tracing::debug;

use crate::engine::{DecodeStatus, DecoderEngine};
use crate::params::DecoderParams;
use crate::window::inspect_window_bits;

/// Outcome of [`FrameDecoder::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameStatus {
    NeedsInput,
    NeedsOutput,
    /// A frame ended and input for a following frame remains; the engine was restarted.
    FrameEnd,
    /// A frame ended and the input is exhausted.
    Finished,
}

pub(crate) struct FrameDecoder {
    engine: DecoderEngine,
    max_window_bits: u32,
    header_checked: bool,
    at_endpoint: bool,
    frames: u64,
}

impl FrameDecoder {
    pub(crate) fn new(params: &DecoderParams) -> Self {
        Self {
            engine: DecoderEngine::new(),
            max_window_bits: params.window_bits(),
            header_checked: false,
            at_endpoint: false,
            frames: 0,
        }
    }

    /// Decode from `input` into `output`, advancing `input` past consumed bytes.
    ///
    /// Returns the number of bytes written to `output`.
    pub(crate) fn decode(
        &mut self,
        input: &mut &[u8],
        output: &mut [u8],
    ) -> Result<(usize, FrameStatus)> {
        // A frame may have ended exactly at the end of an earlier input chunk.
        if self.engine.is_finished() && !input.is_empty() {
            self.restart();
        }

        if !self.header_checked {
            if let Some(&first) = input.first() {
                self.check_header(first)?;
            }
        }

        let (consumed, produced, status) = self.engine.decompress(input, output)?;
        *input = &input[consumed..];
        self.at_endpoint = status == DecodeStatus::Finished;

        let status = match status {
            DecodeStatus::NeedsInput => FrameStatus::NeedsInput,
            DecodeStatus::NeedsOutput => FrameStatus::NeedsOutput,
            DecodeStatus::Finished if input.is_empty() => FrameStatus::Finished,
            DecodeStatus::Finished => {
                self.restart();
                FrameStatus::FrameEnd
            }
        };
        Ok((produced, status))
    }

    /// Whether the engine holds output that still has to be drained.
    pub(crate) fn has_pending_output(&self) -> bool {
        self.engine.has_more_output()
    }

    /// Whether the last step completed a frame cleanly.
    pub(crate) fn at_endpoint(&self) -> bool {
        self.at_endpoint
    }

    pub(crate) fn max_window_bits(&self) -> u32 {
        self.max_window_bits
    }

    /// Drop all frame state and start over with a fresh engine.
    pub(crate) fn reset(&mut self) {
        self.engine = DecoderEngine::new();
        self.header_checked = false;
        self.at_endpoint = false;
        self.frames = 0;
    }

    fn check_header(&mut self, first: u8) -> Result<()> {
        let window_bits = inspect_window_bits(first);
        if window_bits > self.max_window_bits {
            debug!(
                target: "oxiarc::brotli",
                window_bits,
                max_window_bits = self.max_window_bits,
                frame = self.frames,
                "rejecting brotli frame with oversized window"
            );
            return Err(OxiArcError::stream_rejected(
                window_bits,
                self.max_window_bits,
            ));
        }
        self.header_checked = true;
        Ok(())
    }

    fn restart(&mut self) {
        self.frames += 1;
        debug!(
            target: "oxiarc::brotli",
            completed_frames = self.frames,
            "brotli frame ended with trailing input, starting next frame"
        );
        // The engine cannot be reset in place.
        self.engine = DecoderEngine::new();
        self.header_checked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress;

    fn decode_all(decoder: &mut FrameDecoder, mut input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buffer = [0u8; 64];
        loop {
            let (produced, status) = decoder.decode(&mut input, &mut buffer)?;
            out.extend_from_slice(&buffer[..produced]);
            match status {
                FrameStatus::Finished => return Ok(out),
                FrameStatus::NeedsInput if input.is_empty() => return Ok(out),
                _ => {}
            }
        }
    }

    #[test]
    fn test_restart_between_concatenated_frames() {
        let mut stream = compress(b"abc").unwrap();
        stream.extend(compress(b"def").unwrap());

        let mut decoder = FrameDecoder::new(&DecoderParams::default());
        let out = decode_all(&mut decoder, &stream).unwrap();
        assert_eq!(out, b"abcdef");
        assert!(decoder.at_endpoint());
        assert_eq!(decoder.frames, 1);
    }

    #[test]
    fn test_restart_when_frame_ends_on_chunk_boundary() {
        let first = compress(b"abc").unwrap();
        let second = compress(b"def").unwrap();

        let mut decoder = FrameDecoder::new(&DecoderParams::default());
        let mut out = decode_all(&mut decoder, &first).unwrap();
        assert!(decoder.at_endpoint());
        out.extend(decode_all(&mut decoder, &second).unwrap());
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn test_second_frame_header_is_checked() {
        let mut stream = compress(b"abc").unwrap();
        // Header of a frame declaring a 16 MiB window.
        stream.push(0x0F);

        let mut decoder = FrameDecoder::new(&DecoderParams::default());
        let err = decode_all(&mut decoder, &stream).unwrap_err();
        assert!(matches!(
            err,
            OxiArcError::StreamRejected {
                window_bits: 24,
                max_window_bits: 22
            }
        ));
    }

    #[test]
    fn test_empty_input_leaves_header_armed() {
        let mut decoder = FrameDecoder::new(&DecoderParams::default());
        let mut input: &[u8] = &[];
        let mut buffer = [0u8; 8];
        let (produced, status) = decoder.decode(&mut input, &mut buffer).unwrap();
        assert_eq!(produced, 0);
        assert_eq!(status, FrameStatus::NeedsInput);
        assert!(!decoder.header_checked);
        assert!(!decoder.at_endpoint());
    }

    #[test]
    fn test_reset_clears_frame_state() {
        let mut stream = compress(b"abc").unwrap();
        stream.extend(compress(b"def").unwrap());

        let mut decoder = FrameDecoder::new(&DecoderParams::new(Some(20)).unwrap());
        decode_all(&mut decoder, &stream).unwrap();
        assert_eq!(decoder.frames, 1);

        decoder.reset();
        assert_eq!(decoder.frames, 0);
        assert!(!decoder.header_checked);
        assert!(!decoder.at_endpoint());
        assert_eq!(decoder.max_window_bits(), 20);
        assert_eq!(decode_all(&mut decoder, &stream).unwrap(), b"abcdef");
    }
}
