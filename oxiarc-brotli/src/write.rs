//! Blocking Brotli writers over [`std::io::Write`].

use std::io::{self, Write};

use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::traits::FlushMode;

use crate::params::{DecoderParams, EncoderParams};
use crate::session::CodecSession;

/// A writer that compresses or decompresses everything written to it into `W`.
///
/// Call [`BrotliWriter::finish`] when done: a compressing writer emits the end
/// of the frame there, and a decompressing writer checks that the last frame
/// was complete. Dropping the writer without finishing loses that tail.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::{BrotliWriter, EncoderParams, decompress};
/// use std::io::Write;
///
/// let mut writer = BrotliWriter::new(Vec::new(), EncoderParams::default()).unwrap();
/// writer.write_all(b"written through").unwrap();
/// let compressed = writer.finish().unwrap();
/// assert_eq!(decompress(&compressed).unwrap(), b"written through");
/// ```
pub struct BrotliWriter<W> {
    inner: W,
    session: CodecSession,
}

impl<W: Write> BrotliWriter<W> {
    /// Create a writer compressing into `inner`.
    pub fn new(inner: W, params: EncoderParams) -> Result<Self> {
        Ok(Self {
            inner,
            session: CodecSession::with_encoder_params(params)?,
        })
    }

    /// Create a writer decompressing into `inner`.
    pub fn decompressing(inner: W, params: DecoderParams) -> Result<Self> {
        Ok(Self {
            inner,
            session: CodecSession::with_decoder_params(params)?,
        })
    }

    fn pump(&mut self, mut input: &[u8], flush: FlushMode) -> Result<()> {
        loop {
            let (more, chunk) = self.session.pump_once(&mut input, flush)?;
            self.inner.write_all(chunk)?;
            if !more && input.is_empty() {
                return Ok(());
            }
        }
    }

    /// Complete the stream and return the sink.
    ///
    /// # Errors
    ///
    /// A decompressing writer fails with [`OxiArcError::PrematureEnd`] unless
    /// the data written so far ended on a frame boundary.
    pub fn finish(mut self) -> Result<W> {
        if self.session.is_compressing() {
            let mut input: &[u8] = &[];
            let mut idle = 0;
            while !self.session.is_finished() {
                let (more, chunk) = self.session.pump_once(&mut input, FlushMode::Finish)?;
                let produced = chunk.len();
                self.inner.write_all(chunk)?;
                idle = if produced == 0 && !more { idle + 1 } else { 0 };
                if idle > 1 {
                    return Err(OxiArcError::compression_failed(
                        "brotli encoder made no progress while finishing",
                    ));
                }
            }
        } else if !self.session.at_endpoint() {
            return Err(OxiArcError::premature_end("brotli"));
        }

        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Get a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

impl<W: Write> Write for BrotliWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.pump(buf, FlushMode::None)?;
        Ok(buf.len())
    }

    /// Emits everything compressed so far as a decodable prefix, then flushes the sink.
    fn flush(&mut self) -> io::Result<()> {
        if self.session.is_compressing() {
            self.pump(&[], FlushMode::Sync)?;
        }
        self.inner.flush()
    }
}

impl<W> std::fmt::Debug for BrotliWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrotliWriter")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
