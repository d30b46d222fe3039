//! Client certificate material

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Paths to the PEM client certificate and private key used for X.509 auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCertConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl ClientCertConfig {
    #[must_use]
    pub fn new(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            cert_file: cert_file.into(),
            key_file: key_file.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn cert_file(&self) -> &Path {
        &self.cert_file
    }

    #[inline]
    #[must_use]
    pub fn key_file(&self) -> &Path {
        &self.key_file
    }
}
