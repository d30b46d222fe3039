//! Stat: `HEAD` for plain targets, `PROPFIND` for WebDAV ones

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderValue};

use super::base::OperationCore;
use super::kind::{Configured, Operation, OperationKind};
use super::Progress;
use crate::error::{self, Error, Result};
use crate::transport::{RequestMethod, Transport};
use crate::webdav;

/// Largest `PROPFIND` answer a stat buffers.
pub const MAX_STAT_BODY: usize = 1_000_000;

pub type StatOperation = Operation<StatKind>;

/// What is known about the target before the first request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatTarget {
    /// The target speaks WebDAV.
    pub dav: bool,
    /// The target is the authoritative origin rather than a redirector or cache.
    pub origin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatFlags {
    pub readable: bool,
    pub directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatInfo {
    pub size: u64,
    pub flags: StatFlags,
    pub modified: DateTime<Utc>,
}

impl StatInfo {
    #[inline]
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.flags.directory
    }
}

/// Request and decoding state of a stat.
#[derive(Debug)]
pub struct StatKind {
    target: StatTarget,
    method: RequestMethod,
    body: BytesMut,
    overflowed: bool,
    decoded: Option<(Option<u64>, bool)>,
}

impl StatKind {
    #[must_use]
    pub fn new(target: StatTarget) -> Self {
        Self {
            target,
            method: RequestMethod::Head,
            body: BytesMut::new(),
            overflowed: false,
            decoded: None,
        }
    }

    #[must_use]
    pub fn target(&self) -> StatTarget {
        self.target
    }

    /// Whether the request in flight is a `PROPFIND`.
    #[must_use]
    pub fn is_propfind(&self) -> bool {
        self.method == RequestMethod::Propfind
    }

    fn apply_method(&mut self, propfind: bool, transport: &mut dyn Transport) {
        if propfind {
            self.method = RequestMethod::Propfind;
            transport.set_headers(depth_one());
        } else {
            self.method = RequestMethod::Head;
            transport.set_headers(HeaderMap::new());
        }
        transport.set_method(self.method);
    }

    /// Size and directory flag of the target. `PROPFIND` answers are decoded
    /// once and memoized.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the buffered answer overflowed or is not
    /// a usable multistatus document.
    pub fn stat_info(&mut self, core: &OperationCore) -> Result<(Option<u64>, bool)> {
        if !self.is_propfind() {
            return Ok((core.headers().content_length(), false));
        }
        if let Some(decoded) = self.decoded {
            return Ok(decoded);
        }
        if self.overflowed {
            return Err(oversized());
        }
        let entry = webdav::parse_stat(&self.body).inspect_err(|e| {
            tracing::error!(
                target: "httpfs::operation",
                url = %core.url(),
                error = %e,
                body = %webdav::body_preview(&self.body),
                "Failed to decode PROPFIND response"
            );
        })?;
        let decoded = (entry.size, entry.is_dir);
        self.decoded = Some(decoded);
        Ok(decoded)
    }
}

impl OperationKind for StatKind {
    type Output = StatInfo;

    const NAME: &'static str = "stat";

    fn configure(&mut self, _core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured> {
        self.apply_method(self.target.dav && self.target.origin, transport);
        Ok(Configured::Pending)
    }

    fn on_redirect(&mut self, _core: &OperationCore, transport: &mut dyn Transport) {
        self.body.clear();
        self.overflowed = false;
        self.decoded = None;
        self.apply_method(self.target.dav, transport);
    }

    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress> {
        if !self.method.expects_body() {
            return Ok(Progress::Continue);
        }
        if self.body.len() + chunk.len() > MAX_STAT_BODY {
            tracing::error!(
                target: "httpfs::operation",
                url = %core.url(),
                limit = MAX_STAT_BODY,
                "Response too large for PROPFIND operation"
            );
            self.overflowed = true;
            return Ok(Progress::Abort);
        }
        self.body.extend_from_slice(chunk);
        Ok(Progress::Continue)
    }

    fn pending_failure(&mut self) -> Option<Error> {
        self.overflowed.then(oversized)
    }

    fn finish(&mut self, core: &OperationCore, _transport: &dyn Transport) -> Result<StatInfo> {
        let (size, is_dir) = self.stat_info(core)?;
        let Some(size) = size else {
            tracing::error!(
                target: "httpfs::operation",
                url = %core.url(),
                "Failed to get stat info"
            );
            return Err(error::missing_metadata("Server responded without object size"));
        };

        if self.is_propfind() {
            tracing::debug!(
                target: "httpfs::operation",
                url = %core.url(),
                size,
                is_dir,
                "Successful propfind operation"
            );
        } else {
            tracing::debug!(
                target: "httpfs::operation",
                url = %core.url(),
                size,
                "Successful stat operation"
            );
        }

        if !self.target.origin {
            record_mirror(core);
        }

        Ok(StatInfo {
            size,
            flags: StatFlags {
                readable: true,
                directory: is_dir,
            },
            modified: Utc::now(),
        })
    }

    fn release(&mut self, _transport: &mut dyn Transport) {
        self.body = BytesMut::new();
    }
}

fn record_mirror(core: &OperationCore) {
    let Some(cache) = core.context().mirror_cache.as_ref() else {
        tracing::debug!(target: "httpfs::operation", "No director cache available");
        return;
    };
    match core.mirror() {
        Some(mirror) => {
            tracing::debug!(
                target: "httpfs::operation",
                mirror = %mirror.url,
                depth = mirror.depth,
                "Caching response URL"
            );
            cache.put(&mirror.url, mirror.depth);
        }
        None => {
            tracing::debug!(target: "httpfs::operation", "No link information found in headers");
        }
    }
}

pub(crate) fn depth_one() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("depth", HeaderValue::from_static("1"));
    headers
}

fn oversized() -> Error {
    error::decode(
        format!("PROPFIND response exceeded {MAX_STAT_BODY} bytes"),
        "response body truncated at the buffering limit",
    )
}
