//! Page reads: ranged reads plus one CRC-32C per page

use bytes::BytesMut;

use super::base::OperationCore;
use super::kind::{Configured, Operation, OperationKind};
use super::read::ReadKind;
use super::Progress;
use crate::checksum::page_checksums;
use crate::error::{Error, Result};
use crate::transport::Transport;

pub type PageReadOperation = Operation<PageReadKind>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub offset: u64,
    pub length: u64,
    pub buffer: BytesMut,
    /// One checksum per page of `buffer`, in order; the last page may be short.
    pub checksums: Vec<u32>,
}

#[derive(Debug)]
pub struct PageReadKind {
    read: ReadKind,
}

impl PageReadKind {
    #[must_use]
    pub fn new(offset: u64, length: u64, buffer: BytesMut) -> Self {
        Self {
            read: ReadKind::new(offset, length, buffer),
        }
    }

    #[must_use]
    pub fn read(&self) -> &ReadKind {
        &self.read
    }
}

impl OperationKind for PageReadKind {
    type Output = PageInfo;

    const NAME: &'static str = "pgread";

    fn configure(&mut self, core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured> {
        self.read.configure(core, transport)
    }

    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress> {
        self.read.on_body(core, chunk)
    }

    fn finish(&mut self, core: &OperationCore, _transport: &dyn Transport) -> Result<PageInfo> {
        let chunk = self.read.take_chunk()?;
        let checksums = page_checksums(&chunk.buffer, core.config().page_size);
        Ok(PageInfo {
            offset: chunk.offset,
            length: chunk.length,
            buffer: chunk.buffer,
            checksums,
        })
    }

    fn decorate(&self, error: Error) -> Error {
        self.read.decorate(error)
    }

    fn discard(&mut self) {
        self.read.discard();
    }
}
