//! Owned Brotli engine instances.
//!
//! Each wrapper exclusively owns one engine state from the `brotli` crate and
//! releases it when dropped. The wrappers translate the engine's in/out
//! offset protocol into `(consumed, produced)` pairs and typed statuses.

use brotli::enc::StandardAlloc;
use brotli::enc::encode::{BrotliEncoderOperation, BrotliEncoderStateStruct};
use brotli::{BrotliDecompressStream, BrotliResult, BrotliState};
use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::traits::FlushMode;

use crate::params::EncoderParams;

/// Outcome of a single decoder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeStatus {
    /// All input was consumed and the frame is not complete.
    NeedsInput,
    /// The output buffer filled up while the engine still holds output.
    NeedsOutput,
    /// The frame reached its end marker and every byte was emitted.
    Finished,
}

pub(crate) struct EncoderEngine {
    state: Box<BrotliEncoderStateStruct<StandardAlloc>>,
}

impl EncoderEngine {
    pub(crate) fn new(params: &EncoderParams) -> Self {
        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());
        state.params.quality = params.quality() as i32;
        state.params.lgwin = params.window_bits() as i32;
        Self {
            state: Box::new(state),
        }
    }

    /// Run one engine step, returning (bytes consumed, bytes produced).
    pub(crate) fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize)> {
        let op = match flush {
            FlushMode::None => BrotliEncoderOperation::BROTLI_OPERATION_PROCESS,
            FlushMode::Sync | FlushMode::Full => BrotliEncoderOperation::BROTLI_OPERATION_FLUSH,
            FlushMode::Finish => BrotliEncoderOperation::BROTLI_OPERATION_FINISH,
        };

        let mut available_in = input.len();
        let mut input_offset = 0;
        let mut available_out = output.len();
        let mut output_offset = 0;

        let ok = self.state.compress_stream(
            op,
            &mut available_in,
            input,
            &mut input_offset,
            &mut available_out,
            output,
            &mut output_offset,
            &mut None,
            &mut |_, _, _, _| (),
        );
        if !ok {
            return Err(OxiArcError::compression_failed(format!(
                "brotli encoder rejected {flush:?} operation"
            )));
        }

        Ok((input_offset, output_offset))
    }

    /// Whether the engine holds output that did not fit the last buffer.
    pub(crate) fn has_more_output(&self) -> bool {
        self.state.has_more_output()
    }

    /// Whether the stream was finished and all of its output emitted.
    pub(crate) fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

pub(crate) struct DecoderEngine {
    state: Box<BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>>,
    status: DecodeStatus,
}

impl DecoderEngine {
    pub(crate) fn new() -> Self {
        let state = BrotliState::new(
            StandardAlloc::default(),
            StandardAlloc::default(),
            StandardAlloc::default(),
        );
        Self {
            state: Box::new(state),
            status: DecodeStatus::NeedsInput,
        }
    }

    /// Run one engine step, returning (bytes consumed, bytes produced, status).
    pub(crate) fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecodeStatus)> {
        let mut available_in = input.len();
        let mut input_offset = 0;
        let mut available_out = output.len();
        let mut output_offset = 0;
        let mut total_out = 0;

        let result = BrotliDecompressStream(
            &mut available_in,
            &mut input_offset,
            input,
            &mut available_out,
            &mut output_offset,
            output,
            &mut total_out,
            &mut *self.state,
        );

        self.status = match result {
            BrotliResult::ResultFailure => {
                return Err(OxiArcError::decompression_failed(format!(
                    "{:?}",
                    self.state.error_code
                )));
            }
            BrotliResult::NeedsMoreInput => DecodeStatus::NeedsInput,
            BrotliResult::NeedsMoreOutput => DecodeStatus::NeedsOutput,
            BrotliResult::ResultSuccess => DecodeStatus::Finished,
        };

        Ok((input_offset, output_offset, self.status))
    }

    pub(crate) fn has_more_output(&self) -> bool {
        self.status == DecodeStatus::NeedsOutput
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.status == DecodeStatus::Finished
    }
}
