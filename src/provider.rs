//! Provider surface: type name, provider schema, configuration and the
//! resource catalogue

use tracing::info;

use crate::config::ProviderSettings;
use crate::connection::ConnectionProvider;
use crate::error::Result;
use crate::resource::{Attribute, FollowerIndexResource, Resource, Schema};

/// Prefix for every resource type this provider serves
pub const PROVIDER_TYPE_NAME: &str = "ecfollowers";

#[derive(Debug, Clone, Default)]
pub struct EcFollowersProvider;

impl EcFollowersProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    pub fn schema(&self) -> Schema {
        Schema::new(vec![
            Attribute::string("url")
                .required()
                .description("Full URL of the elastic cluster."),
            Attribute::string("username")
                .optional()
                .description("Username for basic authentication."),
            Attribute::string("password")
                .optional()
                .sensitive()
                .description("Password for basic authentication."),
            Attribute::number("timeout_secs")
                .optional()
                .description("Request timeout in seconds, 0 disables it. (Defaults to 30)"),
        ])
    }

    /// Validate settings and produce the shared connection provider
    pub fn configure(&self, settings: ProviderSettings) -> Result<ConnectionProvider> {
        let config = settings.build()?;
        info!(
            endpoint = %config.url(),
            timeout_secs = config.timeout_secs(),
            "Configured ecfollowers provider"
        );
        Ok(ConnectionProvider::new(config))
    }

    /// A follower-index resource bound to the connection's cluster
    pub fn follower_index(&self, connection: &ConnectionProvider) -> Result<FollowerIndexResource> {
        let mut resource = FollowerIndexResource::new();
        resource.configure(connection.client()?);
        Ok(resource)
    }

    /// Every resource type name the provider serves
    pub fn resource_type_names(&self) -> Vec<String> {
        vec![FollowerIndexResource::new().type_name(PROVIDER_TYPE_NAME)]
    }
}
