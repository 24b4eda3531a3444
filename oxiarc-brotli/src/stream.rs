//! Decompression state shared by the blocking and async readers.
//!
//! The readers differ only in how they wait for source bytes. Everything else
//! (when to ask for input, how end of input is judged, how one engine step is
//! taken) lives here so both schedulers run the same state machine:
//!
//! ```text
//! Idle -> AwaitingInput -> Pumping -> MoreOutputPending -> Pumping
//!                                  -> FrameComplete -> Idle
//!                                                   -> Restarting -> AwaitingInput
//!                                  -> ErrorTerminal
//! ```

use oxiarc_core::error::{OxiArcError, Result};
use tracing::trace;

use crate::frame::FrameDecoder;
use crate::params::DecoderParams;
use crate::{BUFFER_SIZE, alloc_buffer};

pub(crate) struct StreamCore {
    buffer: Box<[u8]>,
    pos: usize,
    len: usize,
    frame: FrameDecoder,
}

impl StreamCore {
    pub(crate) fn new(params: &DecoderParams) -> Result<Self> {
        Ok(Self {
            buffer: alloc_buffer(BUFFER_SIZE)?,
            pos: 0,
            len: 0,
            frame: FrameDecoder::new(params),
        })
    }

    /// True when buffered input is drained and the engine holds no output.
    pub(crate) fn wants_input(&self) -> bool {
        self.pos == self.len && !self.frame.has_pending_output()
    }

    /// Buffer the source should read into before calling [`StreamCore::fill`].
    pub(crate) fn input_buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Record `amount` freshly read bytes at the start of the input buffer.
    ///
    /// Returns `Ok(false)` on a clean end of input. A source that ends while a
    /// frame is incomplete yields [`OxiArcError::PrematureEnd`].
    pub(crate) fn fill(&mut self, amount: usize) -> Result<bool> {
        if amount == 0 {
            if self.frame.at_endpoint() {
                trace!(target: "oxiarc::brotli", "brotli source exhausted at frame boundary");
                return Ok(false);
            }
            return Err(OxiArcError::premature_end("brotli"));
        }

        trace!(target: "oxiarc::brotli", bytes = amount, "buffered brotli input");
        self.pos = 0;
        self.len = amount;
        Ok(true)
    }

    /// Take one decoder step into `output`, returning the bytes produced.
    pub(crate) fn step(&mut self, output: &mut [u8]) -> Result<usize> {
        let mut input = &self.buffer[self.pos..self.len];
        let available = input.len();
        let (produced, _) = self.frame.decode(&mut input, output)?;
        self.pos += available - input.len();
        Ok(produced)
    }

    pub(crate) fn at_endpoint(&self) -> bool {
        self.frame.at_endpoint()
    }
}
