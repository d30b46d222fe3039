//! HTTP protocol helpers
//!
//! This module provides the incremental response header parser operations
//! consume, and the byte-range helpers used by ranged reads.

pub mod headers;
pub mod range;

pub use headers::{HeaderParseError, HeaderState, MirrorHint};
pub use range::{ContentRange, parse_content_range, range_header};
