//! Process-wide `tracing` subscriber setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor configuration provides one.
pub const DEFAULT_FILTER: &str = "info,miniapp=debug";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Resolve the filter. An explicit override (command-line verbosity) wins,
/// then `RUST_LOG`, then `configured`, then the default.
pub fn build_filter(
    explicit: Option<&str>,
    configured: Option<&str>,
) -> Result<EnvFilter, InitError> {
    if let Some(directives) = non_blank(explicit) {
        return parse(directives);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    parse(non_blank(configured).unwrap_or(DEFAULT_FILTER))
}

fn non_blank(directives: Option<&str>) -> Option<&str> {
    directives.map(str::trim).filter(|s| !s.is_empty())
}

fn parse(directives: &str) -> Result<EnvFilter, InitError> {
    EnvFilter::try_new(directives).map_err(|e| InitError::InvalidFilter {
        filter: directives.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global fmt subscriber.
pub fn init_tracing(explicit: Option<&str>, configured: Option<&str>) -> Result<(), InitError> {
    let filter = build_filter(explicit, configured)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|_| InitError::AlreadyInstalled)
}
