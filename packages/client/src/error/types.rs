use std::error::Error as StdError;
use std::fmt;

use super::code::ErrorCode;

/// A Result alias where the Err case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed filesystem operation.
#[derive(Clone)]
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub code: ErrorCode,
    pub message: String,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub url: Option<url::Url>,
}

impl Clone for Inner {
    fn clone(&self) -> Self {
        Inner {
            kind: self.kind.clone(),
            code: self.code,
            message: self.message.clone(),
            source: None, // Cannot clone trait objects, so we lose the source
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Invalid arguments when constructing an operation
    Builder,
    /// Connect, DNS, TLS or other transport-level failure
    Transport,
    /// The server answered with an HTTP error status
    Status(http::StatusCode),
    /// No response headers arrived before the deadline
    HeaderTimeout,
    /// The server violated the request contract (offsets, lengths, multipart)
    Protocol,
    /// The response body could not be decoded
    Decode,
    /// The response decoded but carried no usable object size
    MissingMetadata,
    /// An open targeted a directory
    IsDirectory,
    /// A redirect could not be followed
    Redirect,
    /// The connection broker failed to supply a socket
    Broker,
    /// Misconfiguration or an internal invariant failure
    Internal,
}

impl Error {
    pub fn new(kind: Kind, code: ErrorCode, message: impl Into<String>) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                code,
                message: message.into(),
                source: None,
                url: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    /// Appends context to the message, keeping kind and code.
    #[must_use]
    pub fn with_context(mut self, context: &str) -> Self {
        if self.inner.message.is_empty() {
            self.inner.message = context.trim_start().to_string();
        } else {
            self.inner.message.push_str(context);
        }
        self
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// The `(class, subcode)` pair reported to the filesystem layer.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.inner.code
    }

    /// The human readable message, usually the server's status message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("httpfs_client::Error");

        f.field("kind", &self.inner.kind);
        f.field("code", &self.inner.code);
        f.field("message", &self.inner.message);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", url);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.inner.kind {
            Kind::Builder => "invalid operation",
            Kind::Transport => "transport error",
            Kind::Status(code) if code.is_client_error() => "HTTP status client error",
            Kind::Status(_) => "HTTP status server error",
            Kind::HeaderTimeout => "timed out waiting for response headers",
            Kind::Protocol => "protocol violation",
            Kind::Decode => "error decoding response body",
            Kind::MissingMetadata => "missing object metadata",
            Kind::IsDirectory => "is a directory",
            Kind::Redirect => "error following redirect",
            Kind::Broker => "connection broker error",
            Kind::Internal => "internal error",
        };
        if let Kind::Status(code) = &self.inner.kind {
            write!(f, "{prefix} ({})", code.as_str())?;
        } else {
            f.write_str(prefix)?;
        }
        if !self.inner.message.is_empty() {
            write!(f, ": {}", self.inner.message)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
