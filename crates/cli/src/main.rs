//! # dnsq
//!
//! Resolves host names through pooled per-interface clients, with in-flight
//! exchanges bounded per destination and identical lookups coalesced.

mod bootstrap;
mod di;

use clap::{Parser, ValueEnum};
use dnsq_domain::{qtype, CliOverrides, Context, Transport};
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "dnsq")]
#[command(version = "0.1.0")]
#[command(about = "Concurrency-bounded DNS lookups")]
struct Cli {
    /// Host names to resolve
    #[arg(required = true)]
    hosts: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Nameserver address (IPv4 or IPv6 literal)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Nameserver port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Transport: udp or tcp
    #[arg(short = 't', long)]
    transport: Option<Transport>,

    /// Local address to send from
    #[arg(short = 'l', long)]
    local: Option<String>,

    /// Question type
    #[arg(short = 'r', long, value_enum, ignore_case = true, default_value = "a")]
    record_type: RecordTypeArg,

    /// Identical lookups fired concurrently per host
    #[arg(short = 'n', long, default_value_t = 1)]
    parallel: usize,

    /// Maximum exchanges in flight per destination
    #[arg(long)]
    capacity: Option<u16>,

    /// Deadline for one lookup in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecordTypeArg {
    A,
    Aaaa,
}

impl RecordTypeArg {
    fn qtype(self) -> u16 {
        match self {
            RecordTypeArg::A => qtype::A,
            RecordTypeArg::Aaaa => qtype::AAAA,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        server: cli.server.clone(),
        port: cli.port,
        transport: cli.transport,
        local_address: cli.local.clone(),
        per_key_capacity: cli.capacity,
        query_timeout_ms: cli.timeout_ms,
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        server = %config.resolver.server,
        port = config.resolver.port,
        transport = %config.resolver.transport,
        local = %config.resolver.local_address,
        "Configuration loaded"
    );

    let services = di::DnsServices::new(&config)?;
    debug!(local_addresses = ?services.pool.local_addresses(), "Client pool ready");
    let resolve_host = services.resolve_host(&config)?;

    let timeout = config.querier.query_timeout();
    let record_type = cli.record_type.qtype();
    let parallel = cli.parallel.max(1);
    let started = Instant::now();
    let mut failures = 0usize;

    for host in &cli.hosts {
        let lookups = (0..parallel).map(|_| {
            let resolve_host = &resolve_host;
            async move {
                let ctx = Context::with_timeout(timeout);
                resolve_host.execute_with_type(&ctx, host, record_type).await
            }
        });

        for result in join_all(lookups).await {
            match result {
                Ok(resolution) => {
                    let addresses: Vec<String> = resolution
                        .addresses
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    println!(
                        "{}\t{}\t{:.2}ms",
                        resolution.host,
                        addresses.join(", "),
                        resolution.duration.as_secs_f64() * 1000.0
                    );
                }
                Err(e) => {
                    error!(host = %host, error = %e, "Lookup failed");
                    failures += 1;
                }
            }
        }
    }

    info!(
        hosts = cli.hosts.len(),
        lookups = cli.hosts.len() * parallel,
        failures = failures,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Done"
    );

    if failures > 0 {
        anyhow::bail!("{} lookup(s) failed", failures);
    }
    Ok(())
}
