use harddns_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Filter directive read from the environment, e.g. `HARDDNS_LOG=debug`.
pub const LOG_ENV: &str = "HARDDNS_LOG";

/// Install a stderr subscriber for the module.
///
/// Nothing is installed unless `HARDDNS_LOG` is set or request logging is
/// enabled, and an existing subscriber of the host process always wins.
pub fn init(config: Option<&LoggingConfig>) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => match config {
            Some(logging) if logging.log_requests => EnvFilter::new(&logging.level),
            _ => return,
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}
