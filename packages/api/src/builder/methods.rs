//! Operation constructors on `HttpFs`
//!
//! Each method returns the operation, ready for the driver's `setup`, and the
//! receiver its result arrives on.

use std::sync::Arc;

use bytes::BytesMut;
use httpfs_client::file::{FileHandle, FileProperty};
use httpfs_client::operations::{
    ChunkInfo, DirectoryListing, ListdirKind, ListdirOperation, OpenKind, OpenOperation, Operation,
    OperationKind, PageInfo, PageReadKind, PageReadOperation, Pending, ReadKind, ReadOperation,
    StatInfo, StatKind, StatOperation, StatTarget,
};
use httpfs_client::{Result, error};
use url::Url;

use super::core::HttpFs;

impl HttpFs {
    /// Stats `url`.
    ///
    /// # Errors
    ///
    /// Returns a builder error when `url` does not parse.
    pub fn stat(&self, url: &str, target: StatTarget) -> Result<(StatOperation, Pending<StatInfo>)> {
        let url = parse(url)?;
        Ok(StatOperation::new(url, self.context.clone(), StatKind::new(target)))
    }

    /// Opens `file`, recording the effective URL, auth mode, broker and size on it.
    #[must_use]
    pub fn open(&self, file: &Arc<FileHandle>) -> (OpenOperation, Pending<StatInfo>) {
        OpenOperation::new(
            file.url().clone(),
            self.context.clone(),
            OpenKind::new(Arc::clone(file)),
        )
    }

    /// Reads `length` bytes at `offset` of an opened `file` into `buffer`.
    ///
    /// Follows what the open learned: the post-redirect URL, X.509 auth and
    /// the broker.
    ///
    /// # Errors
    ///
    /// Returns a builder error when the recorded URL does not parse.
    pub fn read(
        &self,
        file: &FileHandle,
        offset: u64,
        length: u64,
        buffer: BytesMut,
    ) -> Result<(ReadOperation, Pending<ChunkInfo>)> {
        self.for_file(file, ReadKind::new(offset, length, buffer))
    }

    /// Like [`read`](Self::read), also checksumming each page.
    ///
    /// # Errors
    ///
    /// Returns a builder error when the recorded URL does not parse.
    pub fn pgread(
        &self,
        file: &FileHandle,
        offset: u64,
        length: u64,
        buffer: BytesMut,
    ) -> Result<(PageReadOperation, Pending<PageInfo>)> {
        self.for_file(file, PageReadKind::new(offset, length, buffer))
    }

    /// Lists the directory at `url`.
    ///
    /// # Errors
    ///
    /// Returns a builder error when `url` does not parse.
    pub fn listdir(&self, url: &str) -> Result<(ListdirOperation, Pending<DirectoryListing>)> {
        let url = parse(url)?;
        Ok(ListdirOperation::new(url, self.context.clone(), ListdirKind::new()))
    }

    fn for_file<K: OperationKind>(
        &self,
        file: &FileHandle,
        kind: K,
    ) -> Result<(Operation<K>, Pending<K::Output>)> {
        let url = match file.property(FileProperty::LastUrl) {
            Some(last) => parse(&last)?,
            None => file.url().clone(),
        };
        let x509 = file.property(FileProperty::UseX509Auth).as_deref() == Some("true");

        let (operation, pending) = Operation::new(url, self.context.clone(), kind);
        let mut operation = operation.with_x509(x509);
        if let Some(broker) = file.property(FileProperty::BrokerUrl) {
            operation = operation.with_broker_url(broker);
        }
        Ok((operation, pending))
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| error::builder(format!("invalid URL {url:?}: {e}")).with(e))
}
