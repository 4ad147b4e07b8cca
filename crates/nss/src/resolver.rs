use crate::logging;
use harddns_application::ports::{DnsUpstream, UpstreamHandle};
use harddns_application::use_cases::{
    LookupRequest, Resolution, ResolutionPolicy, ResolveHostUseCase,
};
use harddns_domain::{Config, DomainError};
use harddns_infrastructure::DohClient;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{error, info};

/// Overrides the configuration file read by the module.
pub const CONFIG_ENV: &str = "HARDDNS_CONFIG";

/// Shared upstream plus the resolution engine, built once per process.
pub struct NssResolver {
    upstream: UpstreamHandle,
    engine: ResolveHostUseCase,
}

impl NssResolver {
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let client = DohClient::from_config(config)?;
        let policy = ResolutionPolicy {
            query_aaaa: config.resolver.query_aaaa,
            log_requests: config.logging.log_requests,
        };
        Ok(Self::with_upstream(client, policy))
    }

    pub fn with_upstream(upstream: impl DnsUpstream + 'static, policy: ResolutionPolicy) -> Self {
        Self {
            upstream: UpstreamHandle::new(upstream),
            engine: ResolveHostUseCase::new(policy),
        }
    }

    pub fn resolve(&self, request: &LookupRequest) -> Result<Resolution, DomainError> {
        self.engine.execute(&self.upstream, request)
    }
}

static RESOLVER: OnceLock<Result<NssResolver, DomainError>> = OnceLock::new();

fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV).map(PathBuf::from)
}

fn build() -> Result<NssResolver, DomainError> {
    let path = config_path();
    let config = match Config::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(None);
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    logging::init(Some(&config.logging));

    match NssResolver::from_config(&config) {
        Ok(resolver) => {
            info!(upstreams = config.upstreams.len(), "harddns resolver ready");
            Ok(resolver)
        }
        Err(e) => {
            error!(error = %e, "Failed to set up upstreams");
            Err(e)
        }
    }
}

/// The process-wide resolver. A configuration failure is remembered and
/// reported on every call.
pub fn global() -> Result<&'static NssResolver, DomainError> {
    RESOLVER.get_or_init(build).as_ref().map_err(Clone::clone)
}
