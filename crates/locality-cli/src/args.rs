use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for locality-cli
#[derive(Debug, Parser)]
#[command(
    name = "locality",
    version,
    about = "CLI for postal code search and city/state resolution"
)]
pub struct CliArgs {
    /// Dataset to serve lookups from (.json, .json.gz or compiled .bin; default: bundled sample)
    #[arg(short = 'd', long = "data", global = true)]
    pub data: Option<PathBuf>,

    /// Base URL of the REST API; switches to the HTTP backend (e.g. https://portal.example.com/api)
    #[arg(short = 'e', long = "endpoint", global = true, conflicts_with = "data")]
    pub endpoint: Option<String>,

    /// Bearer token sent with HTTP requests
    #[arg(long = "token", global = true)]
    pub token: Option<String>,

    /// JSON file with lookup settings (minQueryChars, debounceMs, pageSize, ...)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Restrict searches to one country id (e.g. US)
    #[arg(long = "country", global = true)]
    pub country: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the dataset contents
    Stats,

    /// Search postal codes (no debounce, one request)
    Search {
        /// Query text; matched against codes and city names
        query: String,
    },

    /// Resolve city and state for a postal code id
    Resolve {
        /// Postal code id as returned by `search`
        postal_code_id: String,
    },

    /// Replay keystrokes through the debounced form helper
    Fill {
        /// Successive contents of the postal code field (e.g. 6 62 627)
        #[arg(required = true)]
        keystrokes: Vec<String>,

        /// Candidate to select after the last keystroke (1-based)
        #[arg(short = 'p', long = "pick", default_value_t = 1)]
        pick: usize,

        /// Street line to fill before validating
        #[arg(long = "street")]
        street: Option<String>,
    },

    /// Compile a source dataset into the binary form
    Build {
        /// Source dataset (.json or .json.gz)
        input: PathBuf,
        /// Output file (.bin)
        output: PathBuf,
    },
}
