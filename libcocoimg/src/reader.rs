use std::io::{self, ErrorKind, Read};

use crate::error::{Error, Result};

/// Fixed-size values a [`ByteReader`] can decode. Multi-byte values are big-endian, the byte
/// order of the 6809.
pub trait Readable: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decodes a value from exactly [`Self::SIZE`] bytes
    fn from_be_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_readable {
    ($($t:ty),*) => {
        $(
            impl Readable for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_be_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_be_bytes(buf)
                }
            }
        )*
    };
}

impl_readable!(u8, i8, u16, u32);

/// Reads typed values from a byte stream, reporting short input as [`Error::TruncatedInput`]
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteReader<R> {
    /// Wraps `inner`; positions are counted from the point where the reader is created
    pub const fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Returns the wrapped stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fills `buf`, keeping `position` in step with what the stream actually consumed
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.position;
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::TruncatedInput {
                        offset,
                        needed: buf.len(),
                    })
                }
                Ok(n) => {
                    filled += n;
                    self.position += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }

    /// Reads one value
    ///
    /// # Errors
    ///
    /// [`Error::TruncatedInput`] if the stream ends early, [`Error::Io`] on other failures
    pub fn read<T: Readable>(&mut self) -> Result<T> {
        let mut buf = [0; 8];
        let buf = &mut buf[..T::SIZE];
        self.fill(buf)?;
        Ok(T::from_be_slice(buf))
    }

    /// Reads `count` consecutive values
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `count` values cannot be held in memory, otherwise see
    /// [`Self::read`]
    pub fn read_vector<T: Readable>(&mut self, count: usize) -> Result<Vec<T>> {
        let len = count.checked_mul(T::SIZE).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot read {count} values of {} bytes", T::SIZE))
        })?;
        let mut buf = vec![0; len];
        self.fill(&mut buf)?;
        Ok(buf.chunks_exact(T::SIZE).map(T::from_be_slice).collect())
    }

    /// Reads two values, first `A` then `B`
    ///
    /// # Errors
    ///
    /// See [`Self::read`]
    pub fn read_pair<A: Readable, B: Readable>(&mut self) -> Result<(A, B)> {
        let a = self.read()?;
        let b = self.read()?;
        Ok((a, b))
    }

    /// Discards `count` bytes
    ///
    /// # Errors
    ///
    /// See [`Self::read`]
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.position += skipped;
        if skipped < count {
            return Err(Error::TruncatedInput {
                offset: self.position,
                needed: usize::try_from(count - skipped).unwrap_or(usize::MAX),
            });
        }
        Ok(())
    }
}
