//! locality-cli — Command-line interface for locality-core
//!
//! Drives the postal code lookup from a terminal, either against a local
//! dataset (the bundled sample by default) or against the portal's REST API.
//!
//! Usage examples
//! --------------
//!
//! - Show dataset stats
//!   $ locality-cli stats
//!
//! - One-shot search and resolution
//!   $ locality-cli search 627
//!   $ locality-cli resolve p627001
//!
//! - Replay typing through the debounced helper and pick the second hit
//!   $ locality-cli fill 6 62 627 --pick 2 --street "12 Main Rd"
//!
//! - Same against a live backend
//!   $ locality-cli --endpoint https://portal.example.com/api --token $TOKEN fill 600
//!
//! - Compile a dataset for faster start-up
//!   $ locality-cli build postal_codes.json.gz postal_codes.bin
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::{bail, Context};
use clap::Parser;
use locality_core::{
    build_database, AddressAutocomplete, CompressionMode, DatasetBackend, DbStats, LookupBackend,
    LookupConfig,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => LookupConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LookupConfig::default(),
    };
    if let Some(country) = &args.country {
        config = config.with_country(country.clone());
    }

    // Build never needs a backend
    if let Commands::Build { input, output } = &args.command {
        let db = build_database(input, output, CompressionMode::preferred())
            .with_context(|| format!("building {}", input.display()))?;
        println!("Wrote {}", output.display());
        print_stats(&db.stats());
        return Ok(());
    }

    if let Some(endpoint) = args.endpoint.as_deref() {
        return run_http(endpoint, args.token.clone(), &args.command, config).await;
    }

    let backend = match &args.data {
        Some(path) => DatasetBackend::load(path)
            .with_context(|| format!("loading dataset {}", path.display()))?,
        None => DatasetBackend::bundled()?,
    };

    if let Commands::Stats = args.command {
        print_stats(&backend.db().stats());
        return Ok(());
    }

    run(Arc::new(backend), &args.command, config).await
}

fn init_tracing(verbose: u8) {
    // -v wins over RUST_LOG
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "http")]
async fn run_http(
    endpoint: &str,
    token: Option<String>,
    command: &Commands,
    config: LookupConfig,
) -> anyhow::Result<()> {
    use locality_core::{HttpBackend, HttpConfig};

    let mut http = HttpConfig::new(endpoint);
    http.bearer_token = token;
    let backend = HttpBackend::new(http)?;
    run(Arc::new(backend), command, config).await
}

#[cfg(not(feature = "http"))]
async fn run_http(
    _endpoint: &str,
    _token: Option<String>,
    _command: &Commands,
    _config: LookupConfig,
) -> anyhow::Result<()> {
    bail!("--endpoint needs a build with the 'http' feature")
}

async fn run<B: LookupBackend>(
    backend: Arc<B>,
    command: &Commands,
    config: LookupConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Search { query } => {
            let hits = backend
                .search_postal_codes(config.search_request(query))
                .await?;
            if hits.is_empty() {
                println!("No postal codes found matching: {query}");
            }
            for c in hits {
                println!("{:<10} {}", c.label, c.id);
            }
        }

        Commands::Resolve { postal_code_id } => {
            match backend.resolve_locality(postal_code_id).await? {
                Some(loc) if !loc.is_empty() => {
                    println!("City:  {} ({})", loc.city_name, loc.city_id);
                    println!("State: {} ({})", loc.state_name, loc.state_id);
                }
                _ => eprintln!("No locality found for: {postal_code_id}"),
            }
        }

        Commands::Fill {
            keystrokes,
            pick,
            street,
        } => fill(backend, config, keystrokes, *pick, street.as_deref()).await?,

        Commands::Stats | Commands::Build { .. } => {
            bail!("this command works on a local dataset, not on --endpoint")
        }
    }
    Ok(())
}

/// Feeds the keystrokes as one burst, so the debounce collapses them into a
/// single search, then selects a candidate and waits for city/state.
async fn fill<B: LookupBackend>(
    backend: Arc<B>,
    config: LookupConfig,
    keystrokes: &[String],
    pick: usize,
    street: Option<&str>,
) -> anyhow::Result<()> {
    let form = AddressAutocomplete::new(backend, config);

    for k in keystrokes {
        form.on_input(k);
    }
    form.settle().await;

    let search = form.search();
    info!(
        keystrokes = keystrokes.len(),
        requests = search.requests_sent(),
        "search settled"
    );
    if let Some(err) = search.last_error() {
        bail!("postal code search failed: {err}");
    }

    let candidates = form.candidates();
    if candidates.is_empty() {
        println!("No candidates.");
        return Ok(());
    }
    for (i, c) in candidates.iter().enumerate() {
        println!("{:>3}. {}", i + 1, c.label);
    }

    let chosen = pick
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .with_context(|| format!("--pick {pick} is out of range 1..={}", candidates.len()))?;
    form.select_candidate(chosen);
    if let Some(street) = street {
        form.set_address_lines(street, "");
    }
    form.settle().await;

    if let Some(err) = form.resolver().last_error() {
        warn!(error = %err, "city/state could not be resolved");
    }

    let draft = form.draft();
    println!();
    println!("Street:      {}", draft.address1());
    println!("Postal code: {}", draft.postal_code());
    println!("City:        {}", draft.city());
    println!("State:       {}", draft.state());

    match form.validate() {
        Ok(()) => println!("\nAddress is complete."),
        Err(errors) => {
            println!("\nAddress is incomplete:");
            for (field, msg) in errors.iter() {
                println!("  - {field}: {msg}");
            }
        }
    }
    Ok(())
}

fn print_stats(stats: &DbStats) {
    println!("Dataset statistics:");
    println!("  Countries: {}", stats.countries);
    println!("  States/Regions: {}", stats.states);
    println!("  Cities: {}", stats.cities);
    println!("  Postal codes: {}", stats.postal_codes);
}
