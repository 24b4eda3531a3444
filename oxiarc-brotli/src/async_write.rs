//! Async Brotli writers over [`tokio::io::AsyncWrite`].
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled.

use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use oxiarc_core::error::{OxiArcError, Result};
use oxiarc_core::traits::FlushMode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::params::{DecoderParams, EncoderParams};
use crate::session::CodecSession;

/// An async writer that compresses or decompresses into `W`.
///
/// Implements [`AsyncWrite`]: `poll_flush` emits everything compressed so far
/// as a decodable prefix, and `poll_shutdown` completes the stream before
/// shutting the sink down. [`AsyncBrotliWriter::finish`] completes the stream
/// and flushes the sink without shutting it down, so the sink can keep
/// carrying other data afterwards.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::{AsyncBrotliWriter, EncoderParams, decompress};
/// use tokio::io::AsyncWriteExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut writer = AsyncBrotliWriter::new(Vec::new(), EncoderParams::default()).unwrap();
/// writer.write_all(b"async writer").await.unwrap();
/// let compressed = writer.finish().await.unwrap();
/// assert_eq!(decompress(&compressed).unwrap(), b"async writer");
/// # }
/// ```
pub struct AsyncBrotliWriter<W> {
    inner: W,
    session: CodecSession,
    /// Session output not yet accepted by the sink.
    staged: Vec<u8>,
    staged_pos: usize,
    /// A sync flush was issued and its output is still being drained.
    flushing: bool,
}

impl<W: AsyncWrite + Unpin> AsyncBrotliWriter<W> {
    /// Create a writer compressing into `inner`.
    pub fn new(inner: W, params: EncoderParams) -> Result<Self> {
        Ok(Self::with_session(
            inner,
            CodecSession::with_encoder_params(params)?,
        ))
    }

    /// Create a writer decompressing into `inner`.
    pub fn decompressing(inner: W, params: DecoderParams) -> Result<Self> {
        Ok(Self::with_session(
            inner,
            CodecSession::with_decoder_params(params)?,
        ))
    }

    fn with_session(inner: W, session: CodecSession) -> Self {
        Self {
            inner,
            session,
            staged: Vec::new(),
            staged_pos: 0,
            flushing: false,
        }
    }

    /// Complete the stream and return the sink.
    ///
    /// Same contract as [`BrotliWriter::finish`](crate::BrotliWriter::finish);
    /// the sink is flushed but not shut down.
    pub async fn finish(mut self) -> Result<W> {
        poll_fn(|cx| self.poll_complete(cx)).await?;
        self.inner.flush().await?;
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

    /// Run the session once and stage its output for the sink.
    fn pump(&mut self, input: &mut &[u8], flush: FlushMode) -> Result<bool> {
        let (more, chunk) = self.session.pump_once(input, flush)?;
        self.staged.extend_from_slice(chunk);
        Ok(more)
    }

    /// Hand every staged byte to the sink.
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.staged_pos < self.staged.len() {
            let n = ready!(
                Pin::new(&mut self.inner).poll_write(cx, &self.staged[self.staged_pos..])
            )?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.staged_pos += n;
        }
        self.staged.clear();
        self.staged_pos = 0;
        Poll::Ready(Ok(()))
    }

    /// Drain output the session still holds, pumping with `flush`.
    fn poll_drain_session(&mut self, cx: &mut Context<'_>, flush: FlushMode) -> Poll<Result<()>> {
        loop {
            ready!(self.poll_drain(cx))?;
            if !self.session.has_more_output() {
                return Poll::Ready(Ok(()));
            }
            self.pump(&mut &[][..], flush)?;
        }
    }

    /// Finish the encoder, or check the decoder sits at a frame boundary.
    fn poll_complete(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if !self.session.is_compressing() {
            ready!(self.poll_drain_session(cx, FlushMode::None))?;
            if !self.session.at_endpoint() {
                return Poll::Ready(Err(OxiArcError::premature_end("brotli")));
            }
            return Poll::Ready(Ok(()));
        }

        let mut idle = 0;
        loop {
            ready!(self.poll_drain(cx))?;
            if self.session.is_finished() {
                return Poll::Ready(Ok(()));
            }
            let more = self.pump(&mut &[][..], FlushMode::Finish)?;
            idle = if self.staged.is_empty() && !more { idle + 1 } else { 0 };
            if idle > 1 && !self.session.is_finished() {
                return Poll::Ready(Err(OxiArcError::compression_failed(
                    "brotli encoder made no progress while finishing",
                )));
            }
        }
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for AsyncBrotliWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        // Input is only consumed once earlier output has reached the sink.
        ready!(this.poll_drain_session(cx, FlushMode::None))?;
        loop {
            let mut input = buf;
            let more = this.pump(&mut input, FlushMode::None)?;
            let consumed = buf.len() - input.len();
            if consumed > 0 {
                return Poll::Ready(Ok(consumed));
            }
            if this.staged.is_empty() && !more {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            ready!(this.poll_drain_session(cx, FlushMode::None))?;
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;

        if this.session.is_compressing() {
            if !this.flushing {
                this.pump(&mut &[][..], FlushMode::Sync)?;
                this.flushing = true;
            }
            ready!(this.poll_drain_session(cx, FlushMode::Sync))?;
            this.flushing = false;
        } else {
            ready!(this.poll_drain_session(cx, FlushMode::None))?;
        }

        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_complete(cx))?;
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

impl<W> std::fmt::Debug for AsyncBrotliWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncBrotliWriter")
            .field("session", &self.session)
            .field("staged", &(self.staged.len() - self.staged_pos))
            .finish_non_exhaustive()
    }
}
