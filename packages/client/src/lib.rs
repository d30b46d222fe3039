//! # httpfs client
//!
//! Filesystem operations (stat, open, ranged read, page read, directory
//! listing) over HTTP and WebDAV, written as callback-driven state machines
//! for an external transfer engine.
//!
//! ## Features
//!
//! - **Sans-IO operations** driven through [`HttpOperation`] by any event loop
//! - **Redirect handling** with mirror hints, X.509 upgrade and broker handoff
//! - **Caller-owned read buffers** with offset and overrun validation
//! - **WebDAV multistatus decoding** for stat and listings
//! - **One-shot results** delivered through [`Pending`] receivers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use httpfs_client::{HttpOperation, OperationContext, StatKind, StatOperation, StatTarget, Step};
//! # fn drive(op: &mut dyn HttpOperation) {}
//!
//! let url = url::Url::parse("https://origin.example.org/ns/file.txt").expect("valid url");
//! let (mut op, mut pending) = StatOperation::new(
//!     url,
//!     OperationContext::default(),
//!     StatKind::new(StatTarget { dav: true, origin: true }),
//! );
//! drive(&mut op);
//! if let Ok(result) = pending.try_recv() {
//!     println!("{result:?}");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod broker;
pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod operations;
pub mod telemetry;
pub mod transport;
pub mod webdav;

pub mod prelude;

pub use crate::prelude::*;
