use harddns_domain::config::DEFAULT_CONFIG_PATH;
use harddns_domain::Config;
use std::path::Path;
use tracing::info;

pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(config_path)?;
    config.validate()?;
    Ok(config)
}

pub fn log_config_summary(config_path: Option<&Path>, config: &Config) {
    info!(
        config_file = %config_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH)).display(),
        upstreams = config.upstreams.len(),
        internal_domains = config.internal_domains.0.len(),
        query_aaaa = config.resolver.query_aaaa,
        timeout_ms = config.resolver.timeout_ms,
        "Configuration loaded"
    );
}
