use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `fallback_level`.
///
/// Logs go to stderr; stdout belongs to the rendered panes.
pub fn init_logging(fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
