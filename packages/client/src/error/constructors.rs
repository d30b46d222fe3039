use std::time::Duration;

use http::StatusCode;

use super::BoxError;
use super::code::{ErrorClass, ErrorCode, Subcode, status_code_for};
use super::types::{Error, Kind};
use crate::transport::TransportError;

/// Creates an `Error` for invalid operation arguments.
pub fn builder(message: impl Into<String>) -> Error {
    Error::new(
        Kind::Builder,
        ErrorCode::new(ErrorClass::Internal, Subcode::ArgInvalid),
        message,
    )
}

/// Creates an `Error` for a transport failure reported by the driver.
pub fn transport(e: TransportError) -> Error {
    let subcode = match e {
        TransportError::ConnectFailed(_) | TransportError::Dns(_) => Subcode::NoServer,
        TransportError::Tls(_) => Subcode::NotAuthorized,
        TransportError::Aborted | TransportError::Io(_) | TransportError::Other(_) => {
            Subcode::IoError
        }
    };
    Error::new(
        Kind::Transport,
        ErrorCode::new(ErrorClass::Transport, subcode),
        e.to_string(),
    )
    .with(e)
}

/// Creates an `Error` from a failed HTTP status and the server's status message.
pub fn status(status: StatusCode, message: impl Into<String>) -> Error {
    Error::new(Kind::Status(status), status_code_for(status), message)
}

/// Creates an `Error` for a response whose headers never arrived.
pub fn header_timeout(timeout: Duration) -> Error {
    Error::new(
        Kind::HeaderTimeout,
        ErrorCode::new(ErrorClass::OperationExpired, Subcode::Cancelled),
        format!(
            "No response headers received within {:.3}s",
            timeout.as_secs_f64()
        ),
    )
}

/// Creates an `Error` for a server that broke the request contract.
pub fn protocol(message: impl Into<String>) -> Error {
    Error::new(
        Kind::Protocol,
        ErrorCode::response(Subcode::ServerError),
        message,
    )
}

/// Creates an `Error` for an undecodable response body.
pub fn decode<E: Into<BoxError>>(message: impl Into<String>, e: E) -> Error {
    Error::new(
        Kind::Decode,
        ErrorCode::response(Subcode::FsError),
        message,
    )
    .with(e.into())
}

/// Creates an `Error` for a response without a usable object size.
pub fn missing_metadata(message: impl Into<String>) -> Error {
    Error::new(
        Kind::MissingMetadata,
        ErrorCode::response(Subcode::FsError),
        message,
    )
}

/// Creates an `Error` for an open that resolved to a directory.
pub fn is_directory(message: impl Into<String>) -> Error {
    Error::new(
        Kind::IsDirectory,
        ErrorCode::response(Subcode::IsDirectory),
        message,
    )
}

/// Creates an `Error` for a redirect that cannot be followed.
pub fn redirect(message: impl Into<String>) -> Error {
    Error::new(
        Kind::Redirect,
        ErrorCode::response(Subcode::ServerError),
        message,
    )
}

/// Creates an `Error` for a connection broker failure.
pub fn broker<E: Into<BoxError>>(message: impl Into<String>, e: E) -> Error {
    Error::new(
        Kind::Broker,
        ErrorCode::new(ErrorClass::Internal, Subcode::ServerError),
        message,
    )
    .with(e.into())
}

/// Creates an `Error` for an internal failure.
pub fn internal(message: impl Into<String>) -> Error {
    Error::new(
        Kind::Internal,
        ErrorCode::new(ErrorClass::Internal, Subcode::ServerError),
        message,
    )
}
