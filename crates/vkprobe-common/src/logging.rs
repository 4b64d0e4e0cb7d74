use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "VKPROBE_LOG";

/// Initialize structured logging with environment filter.
/// Set VKPROBE_LOG=debug (or trace, info, warn, error) for verbosity control;
/// otherwise `default_filter` (usually taken from the layer config) applies.
///
/// The layer lives inside someone else's process, so an already installed
/// global subscriber is kept and this call becomes a no-op.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init();
}
