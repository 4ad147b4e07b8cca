use harddns_domain::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level; `--verbose` forces debug.
pub fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    debug!("Logging initialized at level: {}", level);
}
