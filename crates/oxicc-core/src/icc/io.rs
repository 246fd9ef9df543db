//! File abstraction used by the profile and tag codecs
//!
//! Codecs only ever seek, read, write and flush. The same code runs
//! against an on-disk file, a growable memory buffer, or a sink that
//! accumulates an MD5 digest of everything written to it.

use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};

use md5::{Digest, Md5};

use super::error::IccError;

/// Storage consumed by the codecs.
pub trait IccFile {
    /// Total size of the underlying storage in bytes.
    fn get_size(&mut self) -> Result<u64, IccError>;

    /// Move to an absolute byte offset.
    fn seek(&mut self, offset: u64) -> Result<(), IccError>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IccError>;

    /// Write all of `buf` at the current position.
    fn write(&mut self, buf: &[u8]) -> Result<(), IccError>;

    fn flush(&mut self) -> Result<(), IccError>;

    /// Formatted write at the current position.
    fn write_fmt_str(&mut self, args: fmt::Arguments<'_>) -> Result<(), IccError> {
        let text = fmt::format(args);
        self.write(text.as_bytes())
    }

    /// Read exactly `buf.len()` bytes at `offset`.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IccError> {
        self.seek(offset)?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(IccError::TooSmall {
                    expected: buf.len(),
                    actual: filled,
                });
            }
            filled += n;
        }
        Ok(())
    }
}

/// Any seekable std stream, usually a [`std::fs::File`].
#[derive(Debug)]
pub struct StdFile<F> {
    inner: F,
}

impl<F: Read + Write + Seek> StdFile<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Read + Write + Seek> IccFile for StdFile<F> {
    fn get_size(&mut self) -> Result<u64, IccError> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    fn seek(&mut self, offset: u64) -> Result<(), IccError> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IccError> {
        Ok(self.inner.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), IccError> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IccError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Growable in-memory buffer. Seeking past the end and writing zero-fills
/// the gap.
#[derive(Debug, Clone, Default)]
pub struct MemFile {
    data: Vec<u8>,
    pos: usize,
}

impl MemFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access over existing bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl IccFile for MemFile {
    fn get_size(&mut self) -> Result<u64, IccError> {
        Ok(self.data.len() as u64)
    }

    fn seek(&mut self, offset: u64) -> Result<(), IccError> {
        self.pos = usize::try_from(offset).map_err(|_| IccError::TooLarge("seek offset"))?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IccError> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), IccError> {
        let end = self
            .pos
            .checked_add(buf.len())
            .ok_or(IccError::TooLarge("memory file"))?;
        if end > self.data.len() {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| IccError::Allocation { bytes: end })?;
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IccError> {
        Ok(())
    }
}

/// Write-only sink accumulating an MD5 digest.
///
/// Writes must arrive in increasing offset order. Seeking forward hashes
/// zero padding for the skipped bytes.
#[derive(Clone, Default)]
pub struct Md5File {
    hasher: Md5,
    pos: u64,
}

impl Md5File {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink and return the 16-byte digest.
    pub fn finalize(self) -> [u8; 16] {
        self.hasher.finalize().into()
    }
}

impl fmt::Debug for Md5File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Md5File").field("pos", &self.pos).finish()
    }
}

impl IccFile for Md5File {
    fn get_size(&mut self) -> Result<u64, IccError> {
        Ok(self.pos)
    }

    fn seek(&mut self, offset: u64) -> Result<(), IccError> {
        if offset < self.pos {
            return Err(IccError::Unsupported(format!(
                "MD5 sink cannot seek back from {} to {}",
                self.pos, offset
            )));
        }
        const ZEROS: [u8; 64] = [0; 64];
        let mut gap = offset - self.pos;
        while gap > 0 {
            let n = gap.min(ZEROS.len() as u64) as usize;
            self.hasher.update(&ZEROS[..n]);
            gap -= n as u64;
        }
        self.pos = offset;
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, IccError> {
        Err(IccError::Unsupported("MD5 sink is write-only".into()))
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), IccError> {
        self.hasher.update(buf);
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IccError> {
        Ok(())
    }
}
