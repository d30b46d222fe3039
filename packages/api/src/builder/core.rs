//! Core `HttpFsBuilder` and the `HttpFs` handle it builds

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use httpfs_client::cache::{DirectorCache, MirrorCache};
use httpfs_client::config::{ClientCertConfig, OperationConfig, OperationContext};
use httpfs_client::telemetry::{OperationStats, OperationStatsSnapshot};
use httpfs_client::{BrokerConnector, Result};
use url::Url;

/// Fluent builder for [`HttpFs`]
///
/// ```rust,no_run
/// use std::time::Duration;
/// use httpfs::HttpFsBuilder;
///
/// let fs = HttpFsBuilder::new()
///     .header_timeout(Duration::from_secs(10))
///     .client_cert("/etc/grid/usercert.pem", "/etc/grid/userkey.pem")
///     .director_cache()
///     .build()
///     .expect("valid configuration");
/// # let _ = fs;
/// ```
#[must_use]
pub struct HttpFsBuilder {
    config: OperationConfig,
    broker: Option<Arc<dyn BrokerConnector>>,
    mirror_cache: Option<Arc<dyn MirrorCache>>,
    director: Option<Arc<DirectorCache>>,
    stats: Option<Arc<OperationStats>>,
}

impl HttpFsBuilder {
    pub fn new() -> Self {
        Self::with_config(OperationConfig::default())
    }

    /// Seeds the configuration from the `HTTPFS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a builder error when a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(OperationConfig::from_env()?))
    }

    pub fn with_config(config: OperationConfig) -> Self {
        Self {
            config,
            broker: None,
            mirror_cache: None,
            director: None,
            stats: None,
        }
    }

    pub fn header_timeout(mut self, timeout: Duration) -> Self {
        self.config.header_timeout = Some(timeout);
        self
    }

    pub fn client_cert(mut self, cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        self.config.client_cert = Some(ClientCertConfig::new(cert_file, key_file));
        self
    }

    /// Always sends the client certificate to `host`.
    pub fn x509_host(mut self, host: impl Into<String>) -> Self {
        self.config.x509_hosts.push(host.into());
        self
    }

    /// Broker tried once when a direct connection fails.
    pub fn broker_url(mut self, url: impl Into<String>) -> Self {
        self.config.broker_url = Some(url.into());
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn broker(mut self, connector: Arc<dyn BrokerConnector>) -> Self {
        self.broker = Some(connector);
        self
    }

    /// Records mirror hints in an external cache.
    pub fn mirror_cache(mut self, cache: Arc<dyn MirrorCache>) -> Self {
        self.mirror_cache = Some(cache);
        self.director = None;
        self
    }

    /// Records mirror hints in a built-in [`DirectorCache`] that
    /// [`HttpFs::resolve`] consults.
    pub fn director_cache(mut self) -> Self {
        let director = Arc::new(DirectorCache::new());
        let cache: Arc<dyn MirrorCache> = director.clone();
        self.mirror_cache = Some(cache);
        self.director = Some(director);
        self
    }

    pub fn stats(mut self, stats: Arc<OperationStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Validates the configuration and builds the handle.
    ///
    /// # Errors
    ///
    /// Returns a builder error when the configuration is invalid.
    pub fn build(self) -> Result<HttpFs> {
        self.config.validate()?;

        let mut context = OperationContext::new(self.config);
        if let Some(broker) = self.broker {
            context = context.with_broker(broker);
        }
        if let Some(cache) = self.mirror_cache {
            context = context.with_mirror_cache(cache);
        }
        if let Some(stats) = self.stats {
            context = context.with_stats(stats);
        }

        tracing::debug!(
            target: "httpfs::api",
            config = ?context.config,
            broker = context.broker.is_some(),
            mirror_cache = context.mirror_cache.is_some(),
            "Built HttpFs handle"
        );
        Ok(HttpFs {
            context,
            director: self.director,
        })
    }
}

impl Default for HttpFsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpFsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFsBuilder")
            .field("config", &self.config)
            .field("broker", &self.broker.is_some())
            .field("mirror_cache", &self.mirror_cache.is_some())
            .finish_non_exhaustive()
    }
}

/// Handle constructing operations bound to one shared context
#[derive(Debug, Clone)]
pub struct HttpFs {
    pub(crate) context: OperationContext,
    pub(crate) director: Option<Arc<DirectorCache>>,
}

impl HttpFs {
    #[must_use]
    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    #[must_use]
    pub fn stats(&self) -> OperationStatsSnapshot {
        self.context.stats.snapshot()
    }

    /// Resolves `path` against cached mirror hints, when a director cache is
    /// configured and covers it.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.director.as_ref()?.lookup(path)
    }
}
