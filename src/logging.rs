use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the built-in default.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "streamgrab=debug" } else { "streamgrab=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
