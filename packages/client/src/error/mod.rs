//! Error handling for HTTP filesystem operations
//!
//! Every failure an operation can report converges on [`Error`]: a boxed
//! [`Kind`] plus the `(class, subcode, message)` triple the filesystem layer
//! expects, the optional source error and the URL it happened on.

pub mod classification;
pub mod code;
pub mod constructors;
pub mod conversions;
pub mod types;

pub use code::{ErrorClass, ErrorCode, Subcode, is_error_status, status_code_for};
pub use constructors::*;
pub use types::{Error, Inner, Kind, Result};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
