//! Error handling example for locality-rs
//!
//! Lookups inside the form helper never return errors to the caller: a
//! failed search shows an empty list and a failed resolution leaves city and
//! state empty. This example shows where the errors do surface.

use locality_rs::{
    AddressAutocomplete, AddressField, DatasetBackend, LookupConfig, LookupError, PostalDb, Result,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== locality-rs Error Handling Example ===\n");

    // Example 1: loading errors are returned
    println!("--- Example 1: Missing dataset ---");
    match PostalDb::load_from_path("/no/such/postal_codes.json") {
        Ok(_) => println!("  unexpectedly loaded"),
        Err(LookupError::NotFound(msg)) => println!("  not found: {msg}"),
        Err(e) => println!("  other error: {e}"),
    }
    println!();

    let backend = Arc::new(DatasetBackend::bundled()?);
    let form = AddressAutocomplete::new(backend, LookupConfig::default());

    // Example 2: an unknown postal code
    println!("--- Example 2: Unresolvable postal code ---");
    form.select("does-not-exist", "00000");
    form.settle().await;
    println!("  city: {:?}, state: {:?}", form.draft().city(), form.draft().state());
    match form.resolver().last_error() {
        Some(err) => println!("  last error: {err}"),
        None => println!("  no error recorded"),
    }
    println!();

    // Example 3: validation
    println!("--- Example 3: Required fields ---");
    form.clear();
    if let Err(errors) = form.validate() {
        for (field, msg) in errors.iter() {
            println!("  {field}: {msg}");
        }
        assert!(errors.get(AddressField::PostalCode).is_some());
    }
    println!();

    // Example 4: too-short input is not an error, just nothing happens
    println!("--- Example 4: Short input ---");
    form.on_input("55");
    form.settle().await;
    println!(
        "  requests sent: {}, candidates: {}",
        form.search().requests_sent(),
        form.candidates().len()
    );

    Ok(())
}
