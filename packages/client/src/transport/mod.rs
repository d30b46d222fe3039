//! The transport seam
//!
//! Operations never own sockets or perform I/O. The driver hands each
//! operation a [`Transport`] — its view of one reusable request handle — and
//! the operation configures it in `setup`, reconfigures it on redirect and
//! reverses everything in `release_handle`.

use http::HeaderMap;
use thiserror::Error;
use url::Url;

use crate::config::ClientCertConfig;

/// How the transport obtains its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    /// Open (or reuse) a connection itself.
    #[default]
    Direct,
    /// Ask the operation for a broker-supplied, already connected socket via
    /// [`HttpOperation::take_socket`](crate::operations::HttpOperation::take_socket).
    /// When no socket is available the connect attempt must fail with
    /// [`TransportError::ConnectFailed`].
    Broker,
}

/// One reusable request handle owned by the driver.
pub trait Transport {
    /// Sets the target of the next request.
    fn set_url(&mut self, url: &Url);

    /// Sets the request method; `GET` is the handle's resting state.
    fn set_method(&mut self, method: RequestMethod);

    /// Replaces the custom request headers.
    fn set_headers(&mut self, headers: HeaderMap);

    /// Drops all custom request headers.
    fn clear_headers(&mut self);

    /// Attaches or clears client certificate material.
    fn set_client_cert(&mut self, cert: Option<&ClientCertConfig>);

    fn set_connect_mode(&mut self, mode: ConnectMode);

    /// Registers (`true`) or clears (`false`) the header, body and progress
    /// callbacks that route into the operation.
    fn set_callbacks(&mut self, enabled: bool);

    /// The URL actually used by the last request, after redirects.
    fn effective_url(&self) -> Option<Url>;
}

/// Transfer-level failures reported by the driver when a request completes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("could not connect: {0}")]
    ConnectFailed(String),
    #[error("transfer aborted by a callback")]
    Aborted,
    #[error("TLS failure: {0}")]
    Tls(String),
    #[error("could not resolve host: {0}")]
    Dns(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    #[inline]
    #[must_use]
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, TransportError::ConnectFailed(_))
    }
}

/// Request methods issued by operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    /// Headers-only stat of a plain HTTP target.
    Head,
    /// WebDAV property query; always paired with a `Depth` header.
    Propfind,
}

impl RequestMethod {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Propfind => "PROPFIND",
        }
    }

    /// Whether the response to this method carries a body worth reading.
    #[inline]
    #[must_use]
    pub fn expects_body(self) -> bool {
        !matches!(self, RequestMethod::Head)
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
