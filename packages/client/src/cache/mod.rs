//! Mirror hint caching
//!
//! A redirect may advertise a preferred replica for a whole namespace. Stat
//! operations record those hints through [`MirrorCache`] so later lookups can
//! skip the redirector.

pub mod director_cache;

pub use director_cache::DirectorCache;

/// Sink for mirror hints discovered by stat operations.
pub trait MirrorCache: Send + Sync {
    /// Records that the first `depth` path segments of `url` name a namespace
    /// served by the host in `url`.
    fn put(&self, url: &str, depth: u32);
}
