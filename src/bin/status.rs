use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use connector_health::{
    aggregator::Aggregator,
    api::{ApiState, spawn_api_server},
    config::{Config, RegistryConfig},
    probe::HttpProbe,
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Serve connector status reports over HTTP
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Config file (JSON or TOML)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Connector catalog, replaces the registry from the config file
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("connector_health", level),
        ("connector_status", level),
        ("tower_http", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let mut config = Config::load(args.file.as_deref())?;
    config.apply_env_overrides();

    if let Some(path) = args.catalog {
        config.registry = Some(RegistryConfig::File { path });
    }
    if let Some(bind) = args.bind {
        config.api.bind_addr = bind;
    }

    let registry = config.build_registry()?;
    let aggregator = Aggregator::new(Arc::new(HttpProbe::new()?), config.probe.clone());

    let addr = spawn_api_server(config.api.clone(), ApiState::new(aggregator, registry)).await?;
    info!("serving connector status on http://{addr}/api/v1/connectors/status");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}
