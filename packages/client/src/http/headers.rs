//! Incremental response header parsing
//!
//! The driver feeds raw header lines (status line included, CRLF optional) as
//! they arrive. [`HeaderState`] keeps only what operations need and describes
//! exactly one response: a new status line starts over.

use http::header::{self, HeaderName};
use http::StatusCode;
use thiserror::Error;

use super::range::parse_content_range;

/// Set to `true` by a redirector when the next hop requires client certificates.
pub const X509_REQUIRED: HeaderName = HeaderName::from_static("x-osdf-x509");

/// Broker URL to use when the next hop cannot be reached directly.
pub const BROKER: HeaderName = HeaderName::from_static("x-pelican-broker");

const DUPLICATE_REL: &str = "duplicate";

/// Header-level parse failures. Individually non-fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderParseError {
    #[error("invalid status line: {0:?}")]
    InvalidStatusLine(String),
    #[error("header received before status line: {0:?}")]
    MissingStatusLine(String),
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
    #[error("invalid Content-Range: {0:?}")]
    InvalidContentRange(String),
}

/// An alternate replica advertised through `Link: <url>; rel="duplicate"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorHint {
    pub url: String,
    /// Number of leading path segments forming the namespace the mirror serves.
    pub depth: u32,
    /// Lower is preferred.
    pub priority: u32,
}

/// Decoded state of the most recent response's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderState {
    status_code: u16,
    status_message: String,
    content_length: Option<u64>,
    location: Option<String>,
    offset: u64,
    multipart_byterange: bool,
    mirror: Option<MirrorHint>,
    x509_required: bool,
    broker: Option<String>,
    seen_status: bool,
    complete: bool,
}

impl HeaderState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw header line.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderParseError`] describing the malformed line. State
    /// gathered from earlier lines is kept, so callers may log and continue.
    pub fn parse_line(&mut self, raw: &[u8]) -> Result<(), HeaderParseError> {
        let decoded = String::from_utf8_lossy(raw);
        let line = decoded.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            if !self.seen_status {
                return Err(HeaderParseError::MissingStatusLine(String::new()));
            }
            self.complete = true;
            return Ok(());
        }

        if line.starts_with("HTTP/") {
            *self = Self::default();
            return self.parse_status_line(line);
        }

        if !self.seen_status {
            return Err(HeaderParseError::MissingStatusLine(line.to_string()));
        }

        // Obsolete line folding; nothing we track is ever folded.
        if line.starts_with([' ', '\t']) {
            return Ok(());
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HeaderParseError::MalformedHeader(line.to_string()))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| HeaderParseError::InvalidHeaderName(name.to_string()))?;
        self.apply(&name, value.trim())
    }

    fn parse_status_line(&mut self, line: &str) -> Result<(), HeaderParseError> {
        let invalid = || HeaderParseError::InvalidStatusLine(line.to_string());

        let mut parts = line.splitn(3, ' ');
        let _version = parts.next().ok_or_else(invalid)?;
        let code = parts.next().ok_or_else(invalid)?;
        let status = StatusCode::from_bytes(code.trim().as_bytes()).map_err(|_| invalid())?;

        self.status_code = status.as_u16();
        self.status_message = parts.next().unwrap_or_default().trim().to_string();
        self.seen_status = true;
        Ok(())
    }

    fn apply(&mut self, name: &HeaderName, value: &str) -> Result<(), HeaderParseError> {
        if *name == header::CONTENT_LENGTH {
            let length = value
                .parse()
                .map_err(|_| HeaderParseError::InvalidContentLength(value.to_string()))?;
            self.content_length = Some(length);
        } else if *name == header::LOCATION {
            self.location = Some(value.to_string());
        } else if *name == header::CONTENT_RANGE {
            self.offset = parse_content_range(value)?.start;
        } else if *name == header::CONTENT_TYPE {
            self.multipart_byterange = value
                .to_ascii_lowercase()
                .starts_with("multipart/byteranges");
        } else if *name == header::LINK {
            self.apply_link(value);
        } else if *name == X509_REQUIRED {
            self.x509_required = value.eq_ignore_ascii_case("true");
        } else if *name == BROKER {
            if !value.is_empty() {
                self.broker = Some(value.to_string());
            }
        }
        Ok(())
    }

    /// Keeps the most preferred `rel="duplicate"` link seen so far.
    fn apply_link(&mut self, value: &str) {
        for entry in value.split(',') {
            let Some(hint) = parse_duplicate_link(entry) else {
                continue;
            };
            let better = self
                .mirror
                .as_ref()
                .is_none_or(|current| hint.priority < current.priority);
            if better {
                self.mirror = Some(hint);
            }
        }
    }

    /// True once the blank line terminating the headers has been seen.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The raw status code, 0 before a status line arrived.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    #[inline]
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// First byte offset of the body, from `Content-Range` (0 without one).
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn is_multipart_byterange(&self) -> bool {
        self.multipart_byterange
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&MirrorHint> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub fn x509_required(&self) -> bool {
        self.x509_required
    }

    #[must_use]
    pub fn broker(&self) -> Option<&str> {
        self.broker.as_deref()
    }
}

fn parse_duplicate_link(entry: &str) -> Option<MirrorHint> {
    let mut params = entry.split(';');
    let target = params.next()?.trim();
    let url = target.strip_prefix('<')?.strip_suffix('>')?.trim();
    if url.is_empty() {
        return None;
    }

    let mut is_duplicate = false;
    let mut priority = u32::MAX;
    let mut depth = 0;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "rel" => is_duplicate = value.split_whitespace().any(|rel| rel == DUPLICATE_REL),
            "pri" => priority = value.parse().unwrap_or(u32::MAX),
            "depth" => depth = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    is_duplicate.then(|| MirrorHint {
        url: url.to_string(),
        depth,
        priority,
    })
}
