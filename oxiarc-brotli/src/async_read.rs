//! Async Brotli decompression over [`tokio::io::AsyncRead`].
//!
//! Runs the same state machine as [`BrotliReader`](crate::BrotliReader);
//! waiting for source bytes is a suspension point instead of a blocking call.
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use oxiarc_core::error::Result;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::params::DecoderParams;
use crate::stream::StreamCore;

/// An async reader that decompresses a Brotli stream pulled from `R`.
///
/// Only one read may be outstanding at a time, which `&mut self` enforces.
/// [`AsyncBrotliReader::try_read`] is cancel-safe: if its future is dropped
/// while waiting on the source, the bytes it had already decoded are kept and
/// returned first by the next read.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::{AsyncBrotliReader, compress};
/// use tokio::io::AsyncReadExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let compressed = compress(b"Hello, async Brotli!").unwrap();
/// let mut reader = AsyncBrotliReader::new(&compressed[..]).unwrap();
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).await.unwrap();
/// assert_eq!(out, b"Hello, async Brotli!");
/// # }
/// ```
pub struct AsyncBrotliReader<R> {
    inner: R,
    core: StreamCore,
    /// Output decoded by a cancelled read, handed out before decoding more.
    spill: Vec<u8>,
}

/// Caller buffer being filled by one `try_read`.
///
/// Unless marked done, dropping it moves the decoded prefix into the spill.
struct PendingRead<'a> {
    spill: &'a mut Vec<u8>,
    buf: &'a mut [u8],
    filled: usize,
    done: bool,
}

impl PendingRead<'_> {
    fn take_spill(&mut self) {
        let n = self.spill.len().min(self.buf.len());
        self.buf[..n].copy_from_slice(&self.spill[..n]);
        self.spill.drain(..n);
        self.filled = n;
    }
}

impl Drop for PendingRead<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.spill.extend_from_slice(&self.buf[..self.filled]);
        }
    }
}

async fn decode_into<R: AsyncRead + Unpin>(
    inner: &mut R,
    core: &mut StreamCore,
    out: &mut PendingRead<'_>,
    min_bytes: usize,
) -> Result<()> {
    loop {
        if core.wants_input() {
            let amount = inner.read(core.input_buffer_mut()).await?;
            if !core.fill(amount)? {
                return Ok(());
            }
        }

        out.filled += core.step(&mut out.buf[out.filled..])?;
        if out.filled >= min_bytes {
            return Ok(());
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncBrotliReader<R> {
    /// Create a reader accepting frames with windows up to the default ceiling.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_params(inner, DecoderParams::default())
    }

    /// Create a reader with explicit decoder parameters.
    pub fn with_params(inner: R, params: DecoderParams) -> Result<Self> {
        Ok(Self {
            inner,
            core: StreamCore::new(&params)?,
            spill: Vec::new(),
        })
    }

    /// Read at least `min_bytes` and at most `buf.len()` decompressed bytes.
    ///
    /// Same contract as [`BrotliReader::try_read`](crate::BrotliReader::try_read).
    pub async fn try_read(&mut self, buf: &mut [u8], min_bytes: usize) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let min_bytes = min_bytes.min(buf.len());
        let Self { inner, core, spill } = self;
        let mut pending = PendingRead {
            spill,
            buf,
            filled: 0,
            done: false,
        };
        pending.take_spill();

        let result = if pending.filled > 0 && pending.filled >= min_bytes {
            Ok(())
        } else {
            decode_into(inner, core, &mut pending, min_bytes).await
        };
        pending.done = true;
        result.map(|()| pending.filled)
    }

    /// Whether the last frame read so far ended cleanly.
    pub fn at_endpoint(&self) -> bool {
        self.core.at_endpoint()
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the source; buffered input is discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for AsyncBrotliReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        if !this.spill.is_empty() {
            let n = this.spill.len().min(buf.remaining());
            buf.put_slice(&this.spill[..n]);
            this.spill.drain(..n);
            return Poll::Ready(Ok(()));
        }

        loop {
            if this.core.wants_input() {
                let mut input = ReadBuf::new(this.core.input_buffer_mut());
                ready!(Pin::new(&mut this.inner).poll_read(cx, &mut input))?;
                let amount = input.filled().len();
                if !this.core.fill(amount)? {
                    return Poll::Ready(Ok(()));
                }
            }

            let produced = this.core.step(buf.initialize_unfilled())?;
            if produced > 0 {
                buf.advance(produced);
                return Poll::Ready(Ok(()));
            }
        }
    }
}

impl<R> std::fmt::Debug for AsyncBrotliReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncBrotliReader")
            .field("at_endpoint", &self.core.at_endpoint())
            .field("spilled", &self.spill.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EncoderParams, compress, compress_with};
    use oxiarc_core::OxiArcError;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_try_read_roundtrip() {
        let compressed = compress(b"suspending reader").unwrap();
        let mut reader = AsyncBrotliReader::new(&compressed[..]).unwrap();
        let mut buf = [0u8; 64];
        let n = reader.try_read(&mut buf, 1).await.unwrap();
        assert_eq!(&buf[..n], b"suspending reader");
        assert_eq!(reader.try_read(&mut buf, 1).await.unwrap(), 0);
        assert!(reader.at_endpoint());
    }

    #[tokio::test]
    async fn test_zero_length_read() {
        let mut reader = AsyncBrotliReader::new(&b""[..]).unwrap();
        assert_eq!(reader.try_read(&mut [], 0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_input_arriving_in_pieces() {
        let data = b"delivered over a duplex pipe in small pieces".repeat(20);
        let compressed = compress(&data).unwrap();
        let (mut tx, rx) = tokio::io::duplex(7);

        let writer = tokio::spawn(async move {
            for chunk in compressed.chunks(5) {
                tx.write_all(chunk).await.unwrap();
            }
        });

        let mut reader = AsyncBrotliReader::new(rx).unwrap();
        let mut out = vec![0u8; data.len()];
        let n = reader.try_read(&mut out, data.len()).await.unwrap();
        assert_eq!(n, data.len());
        assert_eq!(out, data);

        writer.await.unwrap();
        let mut rest = [0u8; 8];
        assert_eq!(reader.try_read(&mut rest, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_premature_end() {
        let compressed = compress(b"cut before the end").unwrap();
        let truncated = &compressed[..compressed.len() / 2];
        let mut reader = AsyncBrotliReader::new(truncated).unwrap();
        let mut buf = [0u8; 64];
        let err = reader.try_read(&mut buf, 64).await.unwrap_err();
        assert!(matches!(err, OxiArcError::PrematureEnd { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_read_keeps_decoded_bytes() {
        let mut seed: u64 = 0x9E3779B97F4A7C15;
        let data: Vec<u8> = (0..4000)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 32) as u8
            })
            .collect();
        let compressed = compress_with(&data, EncoderParams::new(1, None).unwrap()).unwrap();
        let half = compressed.len() / 2;

        let (mut tx, rx) = tokio::io::duplex(64 * 1024);
        tx.write_all(&compressed[..half]).await.unwrap();

        let mut reader = AsyncBrotliReader::new(rx).unwrap();
        let mut buf = vec![0u8; data.len()];
        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            reader.try_read(&mut buf, data.len()),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(!reader.spill.is_empty());

        tx.write_all(&compressed[half..]).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out.len(), data.len());
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn test_spill_served_by_try_read_in_small_pieces() {
        let compressed = compress(b"0123456789").unwrap();
        let mut reader = AsyncBrotliReader::new(&compressed[..]).unwrap();
        reader.spill.extend_from_slice(b"spilled:");

        let mut small = [0u8; 3];
        let mut out = Vec::new();
        loop {
            let n = reader.try_read(&mut small, 3).await.unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&small[..n]);
        }
        assert_eq!(out, b"spilled:0123456789");
    }
}
