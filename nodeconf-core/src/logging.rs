use tracing_subscriber::EnvFilter;

/// Variable consulted before falling back to `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "NODECONF_LOG";

/// Installs the global subscriber. Logs go to stderr so that rendered
/// configuration on stdout stays machine readable. Calling this twice is a
/// no-op.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
