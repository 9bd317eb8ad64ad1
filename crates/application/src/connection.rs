//! Host connection provider.

use url::Url;

/// Wallet/host connection settings shared with the page tree.
///
/// The manifest URL comes from configuration and is passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConnection {
    manifest_url: Url,
}

impl HostConnection {
    pub fn new(manifest_url: Url) -> Self {
        tracing::debug!(manifest_url = %manifest_url, "host connection configured");
        Self { manifest_url }
    }

    pub fn manifest_url(&self) -> &Url {
        &self.manifest_url
    }
}
