//! Runtime configuration shared by all operations

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::credentials::ClientCertConfig;
use super::validation::{ConfigError, ConfigResult, validate_header_timeout};

/// Header timeout applied when none (or zero) is configured.
pub const DEFAULT_HEADER_TIMEOUT: Duration = Duration::from_secs(30);

/// Page granularity used by page reads when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

const ENV_CERT_FILE: &str = "HTTPFS_CLIENT_CERT_FILE";
const ENV_KEY_FILE: &str = "HTTPFS_CLIENT_KEY_FILE";
const ENV_HEADER_TIMEOUT: &str = "HTTPFS_HEADER_TIMEOUT_SECS";
const ENV_BROKER_URL: &str = "HTTPFS_BROKER_URL";
const ENV_X509_HOSTS: &str = "HTTPFS_X509_HOSTS";
const ENV_PAGE_SIZE: &str = "HTTPFS_PAGE_SIZE";

/// Settings every operation is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    /// How long to wait for the first response header; `None` or zero means 30s.
    pub header_timeout: Option<Duration>,
    /// Client certificate material for X.509 auth.
    pub client_cert: Option<ClientCertConfig>,
    /// Hosts that always require client certificate auth.
    pub x509_hosts: Vec<String>,
    /// Connection broker to fall back to when direct connection fails.
    pub broker_url: Option<String>,
    /// Page size for page-checksummed reads.
    pub page_size: usize,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            header_timeout: None,
            client_cert: None,
            x509_hosts: Vec::new(),
            broker_url: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl OperationConfig {
    #[must_use]
    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_client_cert(mut self, cert: ClientCertConfig) -> Self {
        self.client_cert = Some(cert);
        self
    }

    #[must_use]
    pub fn with_x509_host(mut self, host: impl Into<String>) -> Self {
        self.x509_hosts.push(host.into());
        self
    }

    #[must_use]
    pub fn with_broker_url(mut self, url: impl Into<String>) -> Self {
        self.broker_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The header timeout actually in force.
    #[inline]
    #[must_use]
    pub fn effective_header_timeout(&self) -> Duration {
        match self.header_timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_HEADER_TIMEOUT,
        }
    }

    /// Whether requests to `host` must present a client certificate.
    #[must_use]
    pub fn requires_x509(&self, host: Option<&str>) -> bool {
        host.is_some_and(|host| {
            self.x509_hosts
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(host))
        })
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the header timeout exceeds one hour
    /// - `page_size` is zero
    /// - only one of certificate and key is configured
    /// - `broker_url` does not parse as a URL
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(timeout) = self.header_timeout {
            validate_header_timeout(timeout)?;
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        if let Some(cert) = &self.client_cert {
            if cert.cert_file.as_os_str().is_empty() {
                return Err(ConfigError::IncompleteCredentials("certificate file"));
            }
            if cert.key_file.as_os_str().is_empty() {
                return Err(ConfigError::IncompleteCredentials("key file"));
            }
        }
        if let Some(broker) = &self.broker_url {
            url::Url::parse(broker).map_err(|e| ConfigError::InvalidBrokerUrl {
                url: broker.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Builds a configuration from `HTTPFS_*` environment variables.
    ///
    /// Intended for the outermost façade; operations only ever see the result.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed, or when the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        match (lookup(ENV_CERT_FILE), lookup(ENV_KEY_FILE)) {
            (Some(cert), Some(key)) => {
                config.client_cert = Some(ClientCertConfig::new(PathBuf::from(cert), PathBuf::from(key)));
            }
            (Some(_), None) => return Err(ConfigError::IncompleteCredentials("key file")),
            (None, Some(_)) => return Err(ConfigError::IncompleteCredentials("certificate file")),
            (None, None) => {}
        }

        if let Some(value) = lookup(ENV_HEADER_TIMEOUT) {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_HEADER_TIMEOUT,
                value: value.clone(),
            })?;
            config.header_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            config.page_size = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PAGE_SIZE,
                value: value.clone(),
            })?;
        }

        config.broker_url = lookup(ENV_BROKER_URL).filter(|url| !url.trim().is_empty());

        if let Some(hosts) = lookup(ENV_X509_HOSTS) {
            config.x509_hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|host| !host.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }
}
