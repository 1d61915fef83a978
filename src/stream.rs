//! A positional byte-stream wrapper adding non-consuming lookahead (`peek`) on top of any
//! `Read + Seek` source.
//!
//! The primitive (de)serializers in [`crate::types`] read and write against a plain
//! [`std::io::Read`]/[`std::io::Write`] the way the underlying KMIP TTLV wire format is laid
//! out: sequentially, tag then type then length then value then padding. A streaming parser,
//! however, sometimes needs to decide *which* decoder to call before consuming any bytes (for
//! example: is the next field present at all, and if so what's its tag or type). That requires
//! peeking ahead without disturbing the read cursor.
//!
//! [`TtlvReader`] provides that by remembering the stream position, reading the requested bytes,
//! then seeking back. It implements [`std::io::Read`] itself so it can be passed anywhere a plain
//! reader is expected.
use std::io::{self, Read, Seek, SeekFrom};

/// Wraps a `Read + Seek` source with a non-consuming [`TtlvReader::peek`].
pub struct TtlvReader<R> {
    inner: R,
}

impl<R: Read + Seek> TtlvReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Reads up to `n` bytes, advancing the cursor. A short read (fewer than `n` bytes available)
    /// is not an error at this level; callers that require an exact length detect the shortfall
    /// themselves.
    pub fn read(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let read = read_up_to(&mut self.inner, &mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }

    /// Reads up to `n` bytes without advancing the cursor.
    pub fn peek(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let pos = self.inner.stream_position()?;
        let result = self.read(n);
        self.inner.seek(SeekFrom::Start(pos))?;
        result
    }

    /// True iff there are no more bytes left to read.
    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.peek(1)?.is_empty())
    }

    /// Number of bytes remaining between the current position and the end of the stream.
    pub fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end.saturating_sub(pos))
    }
}

impl<R: Read + Seek> Read for TtlvReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_up_to(&mut self.inner, buf)
    }
}

/// Fills `buf` as far as the underlying reader allows, treating EOF as a short read rather than
/// an error (mirrors the "short reads are not an error at the stream level" contract of
/// `Read::read` while still trying to fill the whole buffer when possible, like `read_exact`
/// without the hard failure on EOF).
fn read_up_to<R: Read>(mut src: R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match src.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
