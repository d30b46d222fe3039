//! Builder and handle for HTTP filesystem operations

pub mod core;
pub mod methods;

pub use self::core::{HttpFs, HttpFsBuilder};
