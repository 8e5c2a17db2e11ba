//! Basic usage example for locality-rs
//!
//! This example demonstrates how to:
//! - Load the bundled postal dataset
//! - Run one-shot searches and locality lookups
//! - Drive the debounced form helper the way a UI would
//! - Load an existing address in edit mode

use locality_rs::{
    AddressAutocomplete, DatasetBackend, LookupBackend, LookupConfig, Result, StoredAddress,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== locality-rs Basic Usage Example ===\n");

    println!("Loading bundled dataset...");
    let backend = DatasetBackend::bundled()?.with_latency(Duration::from_millis(40));
    let stats = backend.db().stats();
    println!(
        "✓ {} postal codes in {} cities, {} states, {} countries\n",
        stats.postal_codes, stats.cities, stats.states, stats.countries
    );

    // Example 1: direct backend calls
    println!("--- Example 1: One-shot search ---");
    let cfg = LookupConfig::default();
    for c in backend.search_postal_codes(cfg.search_request("600")).await? {
        println!("  {} ({})", c.label, c.id);
    }
    if let Some(loc) = backend.resolve_locality("p600017").await? {
        println!("  p600017 -> {}, {}", loc.city_name, loc.state_name);
    }
    println!();

    // Example 2: typing into the postal code field
    println!("--- Example 2: Debounced form helper ---");
    let backend = Arc::new(backend);
    let form = AddressAutocomplete::new(Arc::clone(&backend), cfg.clone());
    for keystrokes in ["5", "55", "550", "5500"] {
        form.on_input(keystrokes);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    form.settle().await;
    println!(
        "  4 keystrokes, {} request(s), {} candidate(s)",
        form.search().requests_sent(),
        form.candidates().len()
    );

    if let Some(first) = form.candidates().first() {
        form.select_candidate(first);
    }
    form.set_address_lines("12 Main St", "");
    form.settle().await;
    let d = form.draft();
    println!("  {} -> {}, {}", d.postal_code(), d.city(), d.state());
    println!("  valid: {}", form.validate().is_ok());
    println!();

    // Example 3: the cache
    println!("--- Example 3: Cached queries ---");
    form.on_input("5500");
    form.settle().await;
    println!(
        "  same query again, still {} request(s)",
        form.search().requests_sent()
    );
    println!();

    // Example 4: edit mode
    println!("--- Example 4: Edit an existing address ---");
    let stored = StoredAddress {
        address1: Some("1 Beach Rd".into()),
        zip_code_id: Some("p627001".into()),
        zip_code: Some("627001".into()),
        ..StoredAddress::default()
    };
    let edit = AddressAutocomplete::new(backend, cfg).with_draft(stored.into());
    edit.settle().await;
    let d = edit.draft();
    println!("  stored {} resolved to {}, {}", d.postal_code(), d.city(), d.state());

    println!("\n=== Example completed successfully ===");
    Ok(())
}
