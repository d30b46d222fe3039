//! Shared collaborators handed to every operation

use std::fmt;
use std::sync::Arc;

use super::operation::OperationConfig;
use crate::broker::BrokerConnector;
use crate::cache::MirrorCache;
use crate::telemetry::OperationStats;

/// Configuration plus the long-lived services operations talk to.
///
/// Cloning is cheap; all collaborators are reference counted.
#[derive(Clone, Default)]
pub struct OperationContext {
    pub config: Arc<OperationConfig>,
    pub broker: Option<Arc<dyn BrokerConnector>>,
    pub mirror_cache: Option<Arc<dyn MirrorCache>>,
    pub stats: Arc<OperationStats>,
}

impl OperationContext {
    #[must_use]
    pub fn new(config: OperationConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_broker(mut self, broker: Arc<dyn BrokerConnector>) -> Self {
        self.broker = Some(broker);
        self
    }

    #[must_use]
    pub fn with_mirror_cache(mut self, cache: Arc<dyn MirrorCache>) -> Self {
        self.mirror_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: Arc<OperationStats>) -> Self {
        self.stats = stats;
        self
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("config", &self.config)
            .field("broker", &self.broker.is_some())
            .field("mirror_cache", &self.mirror_cache.is_some())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
