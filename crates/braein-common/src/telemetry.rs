//! Tracing subscriber setup

use crate::error::{SiteError, SiteResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// Honors `RUST_LOG`, falling back to `default_filter`.
pub fn init_tracing(default_filter: &str) -> SiteResult<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| SiteError::Telemetry(e.to_string()))
}
