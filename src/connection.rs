//! Connection provider: cluster settings in, client handles out

use std::sync::Arc;

use ecfollowers_ccr_interface::CcrApi;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::elastic::ElasticClient;
use crate::error::{ProviderError, Result};

/// Holds the provider's connection settings for the life of the process
///
/// Cloning is cheap; every clone shares the same read-only settings.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: Arc<ProviderConfig>,
}

impl ConnectionProvider {
    pub fn new(config: ProviderConfig) -> Self {
        if config.has_partial_credentials() {
            warn!("Only one of username/password is set; requests will be sent without credentials");
        }
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build a client handle bound to the configured cluster
    ///
    /// No request is made; an unreachable cluster is only noticed by the
    /// first lifecycle call that uses the handle.
    pub fn client(&self) -> Result<Arc<dyn CcrApi>> {
        debug!(
            endpoint = %self.config.url(),
            authenticated = self.config.credentials().is_some(),
            timeout_secs = self.config.timeout_secs(),
            "Creating cluster client"
        );
        let client = ElasticClient::new(&self.config).map_err(|e| {
            ProviderError::Config(format!("Failed to initialize HTTP client: {}", e))
        })?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;

    #[test]
    fn test_client_bound_to_configured_endpoint() {
        let config = ProviderSettings {
            url: Some("https://es.example.com:9243".to_string()),
            ..Default::default()
        }
        .build()
        .unwrap();
        let provider = ConnectionProvider::new(config);

        let client = provider.client().unwrap();
        assert_eq!(client.endpoint(), "https://es.example.com:9243/");

        // Idempotent: a second handle talks to the same place
        let again = provider.client().unwrap();
        assert_eq!(again.endpoint(), client.endpoint());
    }

    #[test]
    fn test_clones_share_settings() {
        let config = ProviderSettings {
            url: Some("http://localhost:9200".to_string()),
            timeout_secs: Some(7),
            ..Default::default()
        }
        .build()
        .unwrap();
        let provider = ConnectionProvider::new(config);
        let clone = provider.clone();
        assert!(std::ptr::eq(provider.config(), clone.config()));
        assert_eq!(clone.config().timeout_secs(), 7);
    }
}
