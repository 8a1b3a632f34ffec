//! trawl binary entry point.

use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trawl::cli::{Args, OutputFormat};
use trawl::output;
use trawl::scanner::{self, work_items};
use trawl::types::{PortSpec, ScanTarget, TargetSpec};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

/// Route log output to stderr so it never interleaves with results.
fn init_tracing(verbose: bool) {
    let default = if verbose { "trawl=debug" } else { "trawl=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let ports = args
        .ports
        .parse::<PortSpec>()
        .context("invalid port specification")?
        .to_ports();

    // Malformed targets are fatal; resolution failures are reported and
    // skipped so one dead hostname does not kill a multi-host scan.
    let mut targets: Vec<ScanTarget> = Vec::new();
    for raw in &args.targets {
        let spec = TargetSpec::parse(raw).with_context(|| format!("invalid target '{}'", raw))?;
        match spec.resolve().await {
            Ok(target) => targets.push(target),
            Err(err) => output::print_warning(&err.to_string()),
        }
    }
    if targets.is_empty() {
        bail!("no targets could be resolved");
    }

    let config = Arc::new(args.scan_config());
    let items = work_items(&targets, &ports);

    let plain = args.output == OutputFormat::Plain;
    if plain && !args.quiet {
        output::print_scan_header(&targets, ports.len(), &config);
    }

    let report = scanner::run_scan(items, Arc::clone(&config), |result| {
        if plain && result.is_open() {
            output::print_open_line(result);
        }
    })
    .await;

    match args.output {
        OutputFormat::Plain => {
            if !args.quiet {
                output::print_summary(&report)?;
            }
        }
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Csv => output::print_csv(&report)?,
    }

    Ok(())
}
