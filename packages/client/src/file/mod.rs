//! Caller-side file handle state written by open operations

use dashmap::DashMap;
use url::Url;

/// Properties an open records on its file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileProperty {
    /// The effective URL after redirects.
    LastUrl,
    /// `"true"` when client certificate auth ended up in use.
    UseX509Auth,
    /// The connection broker used to reach the server.
    BrokerUrl,
    /// Object size in bytes, decimal.
    ContentLength,
}

impl FileProperty {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FileProperty::LastUrl => "LastURL",
            FileProperty::UseX509Auth => "UseX509Auth",
            FileProperty::BrokerUrl => "BrokerURL",
            FileProperty::ContentLength => "ContentLength",
        }
    }
}

/// A remote file as seen by the filesystem façade.
///
/// Shared between the façade and in-flight operations; properties are
/// written through `&self`.
#[derive(Debug)]
pub struct FileHandle {
    url: Url,
    is_dav: bool,
    is_cached_url: bool,
    properties: DashMap<String, String>,
}

impl FileHandle {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            is_dav: false,
            is_cached_url: false,
            properties: DashMap::new(),
        }
    }

    /// Marks the target as speaking WebDAV.
    #[must_use]
    pub fn with_dav(mut self, is_dav: bool) -> Self {
        self.is_dav = is_dav;
        self
    }

    /// Marks the URL as already resolved (taken from a mirror cache or a
    /// previous open), so it addresses the serving host directly.
    #[must_use]
    pub fn with_cached_url(mut self, is_cached_url: bool) -> Self {
        self.is_cached_url = is_cached_url;
        self
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn is_dav(&self) -> bool {
        self.is_dav
    }

    #[must_use]
    pub fn is_cached_url(&self) -> bool {
        self.is_cached_url
    }

    pub fn set_property(&self, property: FileProperty, value: impl Into<String>) {
        self.properties
            .insert(property.as_str().to_string(), value.into());
    }

    #[must_use]
    pub fn property(&self, property: FileProperty) -> Option<String> {
        self.property_by_name(property.as_str())
    }

    /// Untyped lookup, for properties set by other layers.
    #[must_use]
    pub fn property_by_name(&self, name: &str) -> Option<String> {
        self.properties.get(name).map(|value| value.value().clone())
    }
}
