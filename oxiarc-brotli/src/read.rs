//! Blocking Brotli decompression over [`std::io::Read`].

use std::io::{self, Read};

use oxiarc_core::error::Result;

use crate::params::DecoderParams;
use crate::stream::StreamCore;

/// A reader that decompresses a Brotli stream pulled from `R`.
///
/// Concatenated frames are decoded as one logical stream. The source may be
/// borrowed (`&mut R` implements [`Read`]), in which case it must outlive the
/// reader.
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::{BrotliReader, compress};
/// use std::io::Read;
///
/// let compressed = compress(b"Hello, Brotli!").unwrap();
/// let mut reader = BrotliReader::new(&compressed[..]).unwrap();
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "Hello, Brotli!");
/// ```
pub struct BrotliReader<R> {
    inner: R,
    core: StreamCore,
}

impl<R: Read> BrotliReader<R> {
    /// Create a reader accepting frames with windows up to the default ceiling.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_params(inner, DecoderParams::default())
    }

    /// Create a reader with explicit decoder parameters.
    pub fn with_params(inner: R, params: DecoderParams) -> Result<Self> {
        Ok(Self {
            inner,
            core: StreamCore::new(&params)?,
        })
    }

    /// Read at least `min_bytes` and at most `buf.len()` decompressed bytes.
    ///
    /// Returns fewer than `min_bytes` only when the source ended cleanly at a
    /// frame boundary. An empty `buf` returns 0 without touching the source.
    /// `min_bytes` larger than `buf.len()` is treated as `buf.len()`.
    ///
    /// # Errors
    ///
    /// - [`OxiArcError::StreamRejected`](oxiarc_core::OxiArcError::StreamRejected)
    ///   if a frame declares a window above the ceiling
    /// - [`OxiArcError::DecompressionFailed`](oxiarc_core::OxiArcError::DecompressionFailed)
    ///   on corrupt input
    /// - [`OxiArcError::PrematureEnd`](oxiarc_core::OxiArcError::PrematureEnd)
    ///   if the source ends mid-frame
    ///
    /// Bytes written to `buf` before an error are not rolled back.
    pub fn try_read(&mut self, buf: &mut [u8], min_bytes: usize) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let min_bytes = min_bytes.min(buf.len());
        let mut filled = 0;
        loop {
            if self.core.wants_input() && !self.fill_input()? {
                return Ok(filled);
            }

            filled += self.core.step(&mut buf[filled..])?;
            if filled >= min_bytes {
                return Ok(filled);
            }
        }
    }

    fn fill_input(&mut self) -> Result<bool> {
        let amount = loop {
            match self.inner.read(self.core.input_buffer_mut()) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => break result?,
            }
        };
        self.core.fill(amount)
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
    ///
    /// Reading from it directly desynchronizes the decoder.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the source; buffered input is discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BrotliReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.try_read(buf, 1)?)
    }
}

impl<R> std::fmt::Debug for BrotliReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrotliReader")
            .field("at_endpoint", &self.core.at_endpoint())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress;
    use oxiarc_core::OxiArcError;

    /// Source that counts how often it was asked for bytes.
    struct CountingSource<'a> {
        data: &'a [u8],
        reads: usize,
    }

    impl Read for CountingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            self.data.read(buf)
        }
    }

    /// Source that fails with `Interrupted` before every successful read.
    struct InterruptingSource<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for InterruptingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let n = buf.len().min(3);
            self.data.read(&mut buf[..n])
        }
    }

    #[test]
    fn test_zero_length_read_leaves_source_untouched() {
        let compressed = compress(b"untouched").unwrap();
        let mut source = CountingSource {
            data: &compressed,
            reads: 0,
        };
        let mut reader = BrotliReader::new(&mut source).unwrap();
        assert_eq!(reader.try_read(&mut [], 0).unwrap(), 0);
        drop(reader);
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn test_min_zero_returns_after_one_step() {
        let compressed = compress(b"abc").unwrap();
        let mut reader = BrotliReader::new(&compressed[..]).unwrap();
        let mut buf = [0u8; 8];
        let n = reader.try_read(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], b"abc");
    }

    #[test]
    fn test_min_bytes_satisfied_across_steps() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 97) as u8).collect();
        let compressed = compress(&data).unwrap();
        let mut reader = BrotliReader::new(&compressed[..]).unwrap();

        let mut buf = vec![0u8; data.len()];
        let n = reader.try_read(&mut buf, data.len()).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(buf, data);
        assert_eq!(reader.try_read(&mut buf, 1).unwrap(), 0);
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let compressed = compress(b"interrupted source").unwrap();
        let source = InterruptingSource {
            data: &compressed,
            interrupt: false,
        };
        let mut reader = BrotliReader::new(source).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"interrupted source");
    }

    #[test]
    fn test_premature_end_surfaces_as_unexpected_eof() {
        let compressed = compress(b"some text that will be cut short").unwrap();
        let truncated = &compressed[..compressed.len() - 1];

        let mut reader = BrotliReader::new(truncated).unwrap();
        let mut buf = [0u8; 64];
        let err = reader.try_read(&mut buf, 64).unwrap_err();
        assert!(matches!(err, OxiArcError::PrematureEnd { .. }));

        let mut reader = BrotliReader::new(truncated).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_accessors() {
        let compressed = compress(b"x").unwrap();
        let mut reader = BrotliReader::new(&compressed[..]).unwrap();
        assert_eq!(reader.get_ref().len(), compressed.len());
        assert!(!reader.at_endpoint());
        let mut buf = [0u8; 4];
        reader.try_read(&mut buf, 1).unwrap();
        assert!(reader.at_endpoint());
        assert!(reader.get_mut().is_empty());
        assert!(reader.into_inner().is_empty());
    }
}
