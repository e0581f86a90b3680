//! randread CLI entry point

use anyhow::{Context, Result};
use randread::config::cli::Cli;
use randread::config::workload::OutputFormat;
use randread::config::toml::load_config;
use randread::config::{validator, Config};
use randread::engine::StoreOpener;
use randread::target::BackingStore;
use randread::{logging, output, ReadPool};
use std::sync::Arc;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = load_config(&cli)?;
    logging::init_subscriber(config.debug);
    debug!(?config, "configuration loaded");

    validator::validate_config(&config).context("Configuration validation failed")?;

    if config.format == OutputFormat::Text {
        println!("randread v{}", env!("CARGO_PKG_VERSION"));
        println!("{}", config);
        println!();
    }

    if cli.dry_run {
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run(&config)
}

/// Prepare the store, run the pool once and report
fn run(config: &Config) -> Result<()> {
    let mut store = BackingStore::new(config.path.clone(), config.file_size_bytes());
    if let Some(seed) = config.seed {
        store = store.with_seed(seed);
    }

    // Store creation failure is fatal before any reads
    store
        .ensure()
        .with_context(|| format!("Could not create the file {}", store.path().display()))?;

    let opener = Arc::new(StoreOpener::new(store, config.direct));
    let outcome = ReadPool::run(config, opener)?;

    output::print_results(config, &outcome)?;

    outcome.check(config.on_worker_error)
}
