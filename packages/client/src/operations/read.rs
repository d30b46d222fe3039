//! Ranged reads into a caller-provided buffer

use bytes::BytesMut;
use http::HeaderMap;
use http::header::RANGE;

use super::base::OperationCore;
use super::kind::{Configured, Operation, OperationKind};
use super::Progress;
use crate::error::{self, Error, Result};
use crate::http::range_header;
use crate::transport::{RequestMethod, Transport};

pub type ReadOperation = Operation<ReadKind>;

/// A successful read: `length` bytes starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub offset: u64,
    pub length: u64,
    /// The caller's buffer, truncated to `length`.
    pub buffer: BytesMut,
}

/// Copies a byte-range response into the caller's buffer.
///
/// The buffer is written in place at a cursor and never grown: at most
/// `length` bytes are accepted, and the first one must sit at `offset`.
#[derive(Debug)]
pub struct ReadKind {
    offset: u64,
    length: u64,
    buffer: Option<BytesMut>,
    written: usize,
}

impl ReadKind {
    /// Reads `length` bytes at `offset` into `buffer`, which must hold at
    /// least `length` bytes.
    #[must_use]
    pub fn new(offset: u64, length: u64, buffer: BytesMut) -> Self {
        Self {
            offset,
            length,
            buffer: Some(buffer),
            written: 0,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Bytes copied so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Hands the filled part of the buffer back.
    pub(crate) fn take_chunk(&mut self) -> Result<ChunkInfo> {
        let mut buffer = self
            .buffer
            .take()
            .ok_or_else(|| error::internal("Read buffer was already returned"))?;
        buffer.truncate(self.written);
        Ok(ChunkInfo {
            offset: self.offset,
            length: self.written as u64,
            buffer,
        })
    }
}

impl OperationKind for ReadKind {
    type Output = ChunkInfo;

    const NAME: &'static str = "read";

    fn configure(&mut self, _core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured> {
        let capacity = self.buffer.as_ref().map_or(0, BytesMut::len);
        if (capacity as u64) < self.length {
            return Err(error::builder(format!(
                "Read buffer of {capacity} bytes cannot hold {} bytes",
                self.length
            )));
        }

        // Range requests are inclusive of the end byte; a zero-length read has no range.
        let Some(range) = range_header(self.offset, self.length) else {
            return Ok(Configured::Complete);
        };
        let mut headers = HeaderMap::new();
        headers.insert(RANGE, range);
        transport.set_method(RequestMethod::Get);
        transport.set_headers(headers);
        Ok(Configured::Pending)
    }

    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress> {
        let headers = core.headers();
        if headers.is_multipart_byterange() {
            return Err(error::protocol(
                "Server responded with a multipart byterange which is not supported",
            ));
        }
        if self.written == 0 && headers.offset() != self.offset {
            return Err(error::protocol(
                "Server did not return content with correct offset",
            ));
        }
        if (self.written + chunk.len()) as u64 > self.length {
            return Err(error::protocol(
                "Server sent back more data than requested",
            ));
        }

        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| error::internal("Read buffer was already returned"))?;
        let end = self.written + chunk.len();
        buffer[self.written..end].copy_from_slice(chunk);
        self.written = end;
        Ok(Progress::Continue)
    }

    fn finish(&mut self, _core: &OperationCore, _transport: &dyn Transport) -> Result<ChunkInfo> {
        self.take_chunk()
    }

    fn decorate(&self, error: Error) -> Error {
        let context = format!(" (read operation at offset {})", self.offset);
        error.with_context(&context)
    }

    fn discard(&mut self) {
        self.buffer = None;
    }
}
