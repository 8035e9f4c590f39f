use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, `RUST_LOG` wins over `filter`
///
/// Safe to call more than once, later calls leave the first subscriber in place
pub fn init(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if fmt().with_env_filter(env_filter).try_init().is_err() {
        debug!("logging already initialized");
    }
}
