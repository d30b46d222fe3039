//! Numeric error codes reported to the filesystem layer
//!
//! The remote-storage client expects a failure to carry a coarse class plus a
//! stable numeric subcode. HTTP statuses are folded into that space by
//! [`status_code_for`].

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Coarse failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The server answered, but with an error or an unusable response
    ErrorResponse,
    /// Client-side misconfiguration or broken invariant
    Internal,
    /// The request never completed at the transport level
    Transport,
    /// A deadline passed
    OperationExpired,
}

/// Stable numeric subcodes understood by remote-storage clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Subcode {
    ArgInvalid = 3000,
    ArgMissing = 3001,
    ArgTooLong = 3002,
    FileLocked = 3003,
    FileNotOpen = 3004,
    FsError = 3005,
    InvalidRequest = 3006,
    IoError = 3007,
    NoMemory = 3008,
    NoSpace = 3009,
    NotAuthorized = 3010,
    NotFound = 3011,
    ServerError = 3012,
    Unsupported = 3013,
    NoServer = 3014,
    NotFile = 3015,
    IsDirectory = 3016,
    Cancelled = 3017,
    ItExists = 3018,
    ChecksumError = 3019,
    InProgress = 3020,
    OverQuota = 3021,
    SignatureError = 3022,
    DecryptError = 3023,
    Overloaded = 3024,
}

impl Subcode {
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// The `(class, subcode)` pair carried by every [`Error`](super::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    pub class: ErrorClass,
    pub subcode: Subcode,
}

impl ErrorCode {
    #[inline]
    #[must_use]
    pub const fn new(class: ErrorClass, subcode: Subcode) -> Self {
        Self { class, subcode }
    }

    #[inline]
    #[must_use]
    pub const fn response(subcode: Subcode) -> Self {
        Self::new(ErrorClass::ErrorResponse, subcode)
    }
}

/// Returns true when headers with this status must fail the operation.
///
/// Redirects and informational responses are not errors; anything below 100
/// is a malformed status line and treated as one.
#[inline]
#[must_use]
pub fn is_error_status(status: u16) -> bool {
    !(100..400).contains(&status)
}

/// Maps an HTTP error status onto the filesystem error space.
#[must_use]
pub fn status_code_for(status: StatusCode) -> ErrorCode {
    let subcode = match status {
        StatusCode::BAD_REQUEST => Subcode::InvalidRequest,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Subcode::NotAuthorized,
        StatusCode::NOT_FOUND | StatusCode::GONE => Subcode::NotFound,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => Subcode::Unsupported,
        StatusCode::CONFLICT => Subcode::ItExists,
        StatusCode::RANGE_NOT_SATISFIABLE => Subcode::ArgInvalid,
        StatusCode::LOCKED => Subcode::FileLocked,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => Subcode::Overloaded,
        StatusCode::INSUFFICIENT_STORAGE => Subcode::NoSpace,
        s if s.is_client_error() => Subcode::InvalidRequest,
        _ => Subcode::ServerError,
    };
    ErrorCode::response(subcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_and_success_are_not_errors() {
        assert!(!is_error_status(200));
        assert!(!is_error_status(207));
        assert!(!is_error_status(302));
        assert!(is_error_status(404));
        assert!(is_error_status(503));
        assert!(is_error_status(0));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_code_for(StatusCode::NOT_FOUND).subcode, Subcode::NotFound);
        assert_eq!(status_code_for(StatusCode::FORBIDDEN).subcode, Subcode::NotAuthorized);
        assert_eq!(status_code_for(StatusCode::IM_A_TEAPOT).subcode, Subcode::InvalidRequest);
        assert_eq!(status_code_for(StatusCode::BAD_GATEWAY).subcode, Subcode::ServerError);
        assert_eq!(
            status_code_for(StatusCode::INTERNAL_SERVER_ERROR).class,
            ErrorClass::ErrorResponse
        );
        assert_eq!(Subcode::IsDirectory.as_u32(), 3016);
    }
}
