//! Directory listing via `PROPFIND` with `Depth: 1`

use bytes::{Bytes, BytesMut};
use url::Url;

use super::base::OperationCore;
use super::kind::{Configured, Operation, OperationKind};
use super::stat::depth_one;
use super::Progress;
use crate::error::{self, Error, Result};
use crate::transport::{RequestMethod, Transport};
use crate::webdav::{self, DavEntry};

/// Largest listing a listdir buffers.
pub const MAX_LISTING_BODY: usize = 10_000_000;

pub type ListdirOperation = Operation<ListdirKind>;

/// The raw multistatus answer for a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// The URL that produced the listing, after redirects.
    pub url: Url,
    pub body: Bytes,
}

impl DirectoryListing {
    /// Decodes the body into one entry per resource; the directory itself
    /// is usually the first.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the body is not a multistatus document.
    pub fn entries(&self) -> Result<Vec<DavEntry>> {
        webdav::parse_listing(&self.body)
    }
}

#[derive(Debug, Default)]
pub struct ListdirKind {
    body: BytesMut,
    overflowed: bool,
}

impl ListdirKind {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OperationKind for ListdirKind {
    type Output = DirectoryListing;

    const NAME: &'static str = "listdir";

    fn configure(&mut self, _core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured> {
        transport.set_method(RequestMethod::Propfind);
        transport.set_headers(depth_one());
        Ok(Configured::Pending)
    }

    fn on_redirect(&mut self, _core: &OperationCore, _transport: &mut dyn Transport) {
        self.body.clear();
        self.overflowed = false;
    }

    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress> {
        if self.body.len() + chunk.len() > MAX_LISTING_BODY {
            tracing::error!(
                target: "httpfs::operation",
                url = %core.url(),
                limit = MAX_LISTING_BODY,
                "Response too large for PROPFIND operation"
            );
            self.overflowed = true;
            return Ok(Progress::Abort);
        }
        self.body.extend_from_slice(chunk);
        Ok(Progress::Continue)
    }

    fn pending_failure(&mut self) -> Option<Error> {
        self.overflowed.then(|| {
            error::decode(
                format!("Directory listing exceeded {MAX_LISTING_BODY} bytes"),
                "response body truncated at the buffering limit",
            )
        })
    }

    fn finish(&mut self, core: &OperationCore, _transport: &dyn Transport) -> Result<DirectoryListing> {
        let body = std::mem::take(&mut self.body).freeze();
        tracing::debug!(
            target: "httpfs::operation",
            url = %core.url(),
            bytes = body.len(),
            "Successful listdir operation"
        );
        Ok(DirectoryListing {
            url: core.url().clone(),
            body,
        })
    }

    fn release(&mut self, _transport: &mut dyn Transport) {
        self.body = BytesMut::new();
    }
}
