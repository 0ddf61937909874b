/*!
 * Configuration types for ecfollowers
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ProviderError, Result};

/// Environment variables consulted by [`ProviderSettings::apply_env`]
pub const ENV_URL: &str = "ECFOLLOWERS_URL";
pub const ENV_USERNAME: &str = "ECFOLLOWERS_USERNAME";
pub const ENV_PASSWORD: &str = "ECFOLLOWERS_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "ECFOLLOWERS_TIMEOUT_SECS";

/// Default whole-request timeout for calls to the cluster
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider settings as declared, before validation
///
/// Every field is optional here so a config file, the environment and the
/// command line can each contribute a part. [`ProviderSettings::build`] turns
/// the merged result into a [`ProviderConfig`].
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Full URL of the elastic cluster
    #[serde(default)]
    pub url: Option<String>,

    /// Cluster username
    #[serde(default)]
    pub username: Option<String>,

    /// Cluster password
    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in seconds (0 = no timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| {
            ProviderError::Config(format!(
                "Failed to parse provider config {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Override fields from `ECFOLLOWERS_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_lookup(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable source
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.url = Some(url);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ProviderError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, timeout
                ))
            })?;
            self.timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Validate and freeze the settings
    pub fn build(self) -> Result<ProviderConfig> {
        let raw_url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::Config("The url attribute is required".to_string()))?;

        let base = Url::parse(raw_url.trim())
            .map_err(|e| ProviderError::Config(format!("Invalid cluster url: {}", e)))?;
        // Credentials travel only as basic auth, never inside the url
        if !base.username().is_empty() || base.password().is_some() {
            return Err(ProviderError::Config(
                "Cluster url must not embed credentials, set username and password instead"
                    .to_string(),
            ));
        }
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProviderError::Config(format!(
                "Unsupported scheme '{}' in cluster url, expected http or https",
                base.scheme()
            )));
        }
        if base.cannot_be_a_base() {
            return Err(ProviderError::Config(format!(
                "Cluster url '{}' cannot carry index paths",
                raw_url
            )));
        }

        Ok(ProviderConfig {
            url: base,
            username: self.username,
            password: self.password.map(|p| SecretString::new(p.into_boxed_str())),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Validated connection settings, shared read-only by every resource
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    url: Url,
    username: Option<String>,
    password: Option<SecretString>,
    timeout_secs: u64,
}

impl ProviderConfig {
    /// Base URL of the cluster
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Basic credentials, only when both username and password are set
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password)),
            _ => None,
        }
    }

    /// True when exactly one of username/password was supplied
    pub fn has_partial_credentials(&self) -> bool {
        self.username.is_some() != self.password.is_some()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Logging settings for the command-line host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level for diagnostic output
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    pub verbose: bool,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
