/*!
 * Logging and tracing initialization
 *
 * Stdout carries the JSON records handed back to the host, so console logs
 * go to stderr.
 */

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{ProviderError, Result};

/// Install the global subscriber
///
/// With `log_file` set, events are appended to that file as one JSON object
/// per line. Otherwise they are written to stderr in compact form.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let log_file = config
        .log_file
        .as_deref()
        .map(open_log_file)
        .transpose()?;

    let console = log_file.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });
    let json = log_file.map(|file| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json)
        .try_init()
        .map_err(|e| ProviderError::Config(format!("Logging is already initialized: {}", e)))
}

/// Effective level after the verbose shorthand
pub fn effective_level(config: &LoggingConfig) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    }
}

/// `RUST_LOG` wins; otherwise only this crate's events at the effective level
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("ecfollowers={}", effective_level(config)))
            .map_err(|e| ProviderError::Config(format!("Failed to create log filter: {}", e))),
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Route events to the test harness output; safe to call from every test
#[cfg(test)]
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecfollowers=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .compact()
        .try_init();
}
