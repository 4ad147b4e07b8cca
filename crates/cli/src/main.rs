//! # harddns
//!
//! Diagnostic front end for the harddns NSS module: resolves names through
//! the same engine and upstreams, and checks upstream TLS identities and pins.

mod bootstrap;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use harddns_application::use_cases::{LookupRequest, Resolution};
use harddns_domain::{AddressFamily, Config};
use harddns_infrastructure::DohClient;
use nss_harddns::marshal::{addrtuple, hostent};
use nss_harddns::NssResolver;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "harddns")]
#[command(version)]
#[command(about = "Resolve names over pinned DNS-over-HTTPS, as the NSS module does")]
struct Cli {
    /// Configuration file (default: /etc/harddns/harddns.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a name and print what the NSS module would return
    Resolve {
        name: String,

        #[arg(short, long, value_enum, default_value_t = Family::V4)]
        family: Family,
    },
    /// Connect to every upstream and verify its certificate and pins
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    V4,
    V6,
    Both,
}

impl From<Family> for AddressFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::V4 => AddressFamily::V4,
            Family::V6 => AddressFamily::V6,
            Family::Both => AddressFamily::Both,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref())?;
    bootstrap::init_logging(&config, cli.verbose);
    bootstrap::log_config_summary(cli.config.as_deref(), &config);

    match cli.command {
        Command::Resolve { name, family } => resolve(&config, &name, family.into()),
        Command::Check => check(&config),
    }
}

fn resolve(config: &Config, name: &str, family: AddressFamily) -> anyhow::Result<()> {
    let resolver = NssResolver::from_config(config).context("failed to set up upstreams")?;
    let resolution = resolver
        .resolve(&LookupRequest::new(name, family))
        .with_context(|| format!("resolving {}", name))?;

    print_resolution(&resolution)?;
    Ok(())
}

fn print_resolution(resolution: &Resolution) -> anyhow::Result<()> {
    println!("name:      {}", resolution.canonical_name);
    for alias in resolution.alias_names() {
        println!("alias:     {}", alias);
    }
    for record in resolution.records.addresses(resolution.family) {
        if let Some(ip) = record.ip() {
            println!("address:   {} (ttl {})", ip, record.ttl);
        }
    }
    println!("ttl:       {}", resolution.ttl);

    let needed = match resolution.family {
        AddressFamily::Both => addrtuple::required_size(resolution),
        family => hostent::required_size(resolution, family)?,
    };
    println!("buffer:    {} bytes", needed);
    Ok(())
}

fn check(config: &Config) -> anyhow::Result<()> {
    let mut client = DohClient::from_config(config).context("failed to set up upstreams")?;

    let mut failed = 0;
    for slot in client.slots_mut() {
        let upstream = slot.config().clone();
        let transport = slot.transport_mut();
        match transport.connect(&upstream.ip, upstream.port) {
            Ok(()) => {
                info!(upstream = upstream.label(), "TLS identity verified");
                println!(
                    "{:<20} {}:{:<5} ok   cn={} pins={}",
                    upstream.label(),
                    upstream.ip,
                    upstream.port,
                    upstream.cn,
                    if upstream.has_pins() { "checked" } else { "none" }
                );
            }
            Err(e) => {
                warn!(upstream = upstream.label(), error = %e, "Upstream check failed");
                println!(
                    "{:<20} {}:{:<5} FAIL {}",
                    upstream.label(),
                    upstream.ip,
                    upstream.port,
                    e
                );
                failed += 1;
            }
        }
        transport.close();
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} upstreams failed", failed, config.upstreams.len()));
    }
    Ok(())
}
