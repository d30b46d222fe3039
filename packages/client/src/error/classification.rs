use super::code::ErrorClass;
use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error came from invalid operation arguments.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if the error is a transport-level failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// Returns true if the error was generated from an HTTP error status.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self.inner.kind, Kind::Status(_))
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.inner.kind, Kind::HeaderTimeout)
            || self.inner.code.class == ErrorClass::OperationExpired
    }

    /// Returns true if the server violated the request contract.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self.inner.kind, Kind::Protocol)
    }

    /// Returns true if the error is related to decoding the response's body
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.inner.kind, Kind::Decode)
    }

    /// Returns true if the response lacked a usable object size.
    #[must_use]
    pub fn is_missing_metadata(&self) -> bool {
        matches!(self.inner.kind, Kind::MissingMetadata)
    }

    /// Returns true if an open targeted a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self.inner.kind, Kind::IsDirectory)
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self.inner.kind, Kind::Redirect)
    }

    #[must_use]
    pub fn is_broker(&self) -> bool {
        matches!(self.inner.kind, Kind::Broker)
    }

    /// Returns the status code, if the error was generated from a response.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self.inner.kind {
            Kind::Status(code) => Some(code),
            _ => None,
        }
    }
}
