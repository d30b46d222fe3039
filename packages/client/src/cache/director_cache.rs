//! In-memory mirror cache keyed by namespace prefix

use dashmap::DashMap;
use tracing::{debug, warn};
use url::Url;

use super::MirrorCache;

/// Concurrent map from namespace prefix (`/seg1/seg2`) to the replica base URL
/// serving it.
#[derive(Debug, Default)]
pub struct DirectorCache {
    entries: DashMap<String, Url>,
}

impl DirectorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `path` against the longest cached namespace prefix.
    ///
    /// Returns the full replica URL for `path`, or `None` when no cached
    /// namespace covers it.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Url> {
        let segments = split_segments(path);
        for depth in (0..=segments.len()).rev() {
            let prefix = prefix_of(&segments[..depth]);
            if let Some(base) = self.entries.get(&prefix) {
                let mut url = base.value().clone();
                let rest = &segments[depth..];
                if !rest.is_empty() {
                    let mut joined = url.path().trim_end_matches('/').to_string();
                    for segment in rest {
                        joined.push('/');
                        joined.push_str(segment);
                    }
                    url.set_path(&joined);
                }
                return Some(url);
            }
        }
        None
    }
}

impl MirrorCache for DirectorCache {
    fn put(&self, url: &str, depth: u32) {
        let mut parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(target: "httpfs::cache", url, error = %e, "Ignoring unparseable mirror URL");
                return;
            }
        };
        let depth = depth as usize;
        let segments: Vec<String> = split_segments(parsed.path())
            .into_iter()
            .map(str::to_string)
            .collect();
        if depth > segments.len() {
            warn!(target: "httpfs::cache", url, depth, "Mirror depth exceeds the URL's path; ignoring");
            return;
        }
        let borrowed: Vec<&str> = segments.iter().map(String::as_str).collect();
        let prefix = prefix_of(&borrowed[..depth]);
        parsed.set_path(&prefix);
        parsed.set_query(None);
        parsed.set_fragment(None);
        debug!(target: "httpfs::cache", prefix = %prefix, base = %parsed, "Caching mirror for namespace");
        self.entries.insert(prefix, parsed);
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn prefix_of(segments: &[&str]) -> String {
    let mut prefix = String::from("/");
    prefix.push_str(&segments.join("/"));
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_uses_longest_namespace_prefix() {
        let cache = DirectorCache::new();
        cache.put("https://cache-a.example.org/ns/alpha/file.dat", 1);
        cache.put("https://cache-b.example.org/ns/alpha/deep/file.dat", 2);

        let url = cache
            .lookup("/ns/alpha/x/y.dat")
            .expect("namespace should be cached");
        assert_eq!(url.as_str(), "https://cache-b.example.org/ns/alpha/x/y.dat");

        let url = cache.lookup("/ns/beta.dat").expect("namespace should be cached");
        assert_eq!(url.as_str(), "https://cache-a.example.org/ns/beta.dat");

        assert!(cache.lookup("/other/file").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn rejects_depth_beyond_path() {
        let cache = DirectorCache::new();
        cache.put("https://cache.example.org/a", 3);
        cache.put("::not a url::", 1);
        assert!(cache.is_empty());
    }
}
