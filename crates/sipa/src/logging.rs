//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::LogConfig;

/// Environment variable overriding [`LogConfig::filter`]
pub const LOG_ENV: &str = "SIPA_LOG";

/// Install a formatting subscriber. Returns `false` when a global
/// subscriber was already set, which leaves the existing one in place.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .is_ok()
}
