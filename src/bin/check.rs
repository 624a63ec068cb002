use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use connector_health::{
    aggregator::Aggregator,
    config::{Config, RegistryConfig},
    probe::HttpProbe,
    report::StatusReport,
};
use tracing::{level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

/// Probe every registered connector once and print the report
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Config file (JSON or TOML)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Connector catalog, replaces the registry from the config file
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(long)]
    max_concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Exit with status 1 if any connector is unhealthy
    #[arg(long)]
    fail_on_down: bool,

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
        ("connector_check", level),
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
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let mut config = Config::load(args.file.as_deref())?;
    config.apply_env_overrides();

    if let Some(path) = args.catalog {
        config.registry = Some(RegistryConfig::File { path });
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.probe.per_probe_timeout_ms = timeout_ms;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.probe.max_concurrency = max_concurrency;
    }

    let registry = config.build_registry()?;
    let aggregator = Aggregator::new(Arc::new(HttpProbe::new()?), config.probe.clone());

    let report = aggregator.run_configured(registry.as_ref()).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }

    if args.fail_on_down && report.summary().unhealthy > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table(report: &StatusReport) {
    println!(
        "{:<20} {:<28} {:<6} {:<6} {:>9}  URL",
        "ID", "NAME", "STATE", "CODE", "LATENCY"
    );

    for item in report.items() {
        let state = if item.ok { "up" } else { "down" };
        let code = item
            .status_code
            .map_or_else(|| "-".to_string(), |code| code.to_string());
        let latency = item
            .latency_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms}ms"));

        println!(
            "{:<20} {:<28} {:<6} {:<6} {:>9}  {}",
            item.id, item.name, state, code, latency, item.url
        );
        if let Some(error) = &item.error {
            println!("{:<20} └ {error}", "");
        }
    }

    let summary = report.summary();
    println!(
        "\n{} connectors, {} up, {} down",
        summary.total, summary.healthy, summary.unhealthy
    );
}
