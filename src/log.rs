use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Logging is off by default so
/// table output stays clean; `--verbose` enables debug logs for this crate,
/// and `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "finboard=debug" } else { "off" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .without_time()
        .init();
}
