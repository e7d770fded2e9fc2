//! Tracing subscriber setup.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, e.g. `misophonia_dataset=debug`.
pub const LOG_ENV_VAR: &str = "MISOPHONIA_LOG";

/// Installs the global subscriber, logging to stderr at `info` unless
/// [`LOG_ENV_VAR`] says otherwise.
///
/// Returns false if a subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .is_ok()
}
