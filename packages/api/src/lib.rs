//! httpfs public API
//!
//! A fluent builder producing an [`HttpFs`] handle. Every filesystem call on
//! the handle returns an operation for the caller's driver plus the
//! [`Pending`] receiver its single result will arrive on.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::*;

// Re-export the types needed to drive operations and consume their results
pub use httpfs_client::prelude::*;

/// Main entry point providing static builder methods
pub struct HttpFsApi;

impl HttpFsApi {
    /// Create a builder with default configuration
    ///
    /// Shorthand for `HttpFsBuilder::new()`
    #[must_use]
    pub fn builder() -> HttpFsBuilder {
        HttpFsBuilder::new()
    }

    /// Create a builder seeded from the `HTTPFS_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<HttpFsBuilder> {
        HttpFsBuilder::from_env()
    }
}
