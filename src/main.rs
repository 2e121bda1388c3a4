use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use recdup::{DedupService, ServiceConfig};

const USAGE: &str = "usage:
  recdup index <config.json> <records.psv>
  recdup search <config.json> <records.psv> <queries.psv>

Records are pipe-delimited lines whose columns follow the schema's position
table. `index` builds the retrieval index and reports counters; `search`
indexes the record file, then matches every query record and prints one JSON
line per accepted pair. Engine options accept RECDUP_* environment
overrides; logging follows RUST_LOG.";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("index") if args.len() == 3 => cmd_index(&args[1], &args[2]),
        Some("search") if args.len() == 4 => cmd_search(&args[1], &args[2], &args[3]),
        _ => {
            eprintln!("{USAGE}");
            bail!("invalid arguments");
        }
    }
}

fn load_service(config_path: &str) -> Result<DedupService> {
    let mut config = ServiceConfig::from_file(config_path)
        .with_context(|| format!("loading config {config_path}"))?;
    config.options.apply_env()?;
    DedupService::from_config(config).context("building service")
}

fn cmd_index(config_path: &str, records_path: &str) -> Result<()> {
    let service = load_service(config_path)?;
    let stats = service
        .index_file(records_path)
        .with_context(|| format!("indexing {records_path}"))?;
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

fn cmd_search(config_path: &str, records_path: &str, queries_path: &str) -> Result<()> {
    let service = load_service(config_path)?;
    service
        .index_file(records_path)
        .with_context(|| format!("indexing {records_path}"))?;

    let outcome = service
        .search_file(queries_path)
        .with_context(|| format!("searching {queries_path}"))?;
    for result in &outcome.matches {
        println!("{}", serde_json::to_string(&service.render(result)?)?);
    }

    tracing::info!(
        searched = outcome.searched,
        skipped = outcome.skipped,
        matches = outcome.matches.len(),
        "search finished"
    );
    Ok(())
}
