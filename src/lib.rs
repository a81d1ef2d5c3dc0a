//! datakitten: find out where a dataset lives and what its metadata says.
//!
//! Given a URL, datakitten works out the dataset's origin (e.g. a git
//! repository), its host (e.g. GitHub) and the convention its metadata is
//! published in (e.g. a Frictionless `datapackage.json`). The result is a
//! [`Dataset`] with a uniform, read-only set of metadata accessors that
//! return empty values instead of failing when something is unknown.
//!
//! # Modules
//!
//! - [`dataset`]: The [`Dataset`] facade and its construction options
//! - [`origin`], [`host`], [`format`]: Detection stages, run in that order
//! - [`fetcher`]: Network access behind the [`fetcher::Fetcher`] trait
//! - [`model`]: Value objects returned by the facade
//! - [`summary`]: Text and JSON rendering of a dataset
//! - [`error`]: Error types for datakitten operations

pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod host;
pub mod model;
pub mod origin;
pub mod summary;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

pub use dataset::{Dataset, DatasetOptions};
pub use error::DataKittenError;
pub use format::PublishingFormat;
pub use host::Host;
pub use origin::Origin;

use fetcher::{FetchOptions, HttpFetcher, DEFAULT_USER_AGENT};
use summary::DatasetSummary;

/// The datakitten CLI application.
#[derive(Parser)]
#[command(name = "datakitten")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show every metadata field found for a dataset.
    Inspect(InspectArgs),
    /// Show which origin, host and publishing format apply to a URL.
    Detect(DetectArgs),
}

/// Network settings shared by all subcommands.
#[derive(clap::Args)]
struct FetchArgs {
    /// Per-request timeout in seconds.
    #[arg(long, env = "DATAKITTEN_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// Token for the GitHub API (raises rate limits).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl FetchArgs {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            github_token: self.github_token.clone(),
        }
    }
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// URL giving access to the dataset.
    url: String,

    /// Base URL for resolving relative references.
    #[arg(long)]
    base_url: Option<String>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(flatten)]
    fetch: FetchArgs,
}

/// Arguments for the detect subcommand.
#[derive(clap::Args)]
struct DetectArgs {
    /// URL giving access to the dataset.
    url: String,

    #[command(flatten)]
    fetch: FetchArgs,
}

/// Run the datakitten CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DataKittenError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Detect(args)) => run_detect(args),
        None => {
            println!("datakitten {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Finds out where a dataset lives and what its metadata says.");
            println!();
            println!("Run 'datakitten --help' for usage information.");
            Ok(())
        }
    }
}

fn load(url: String, base_url: Option<String>, fetch: &FetchArgs) -> Dataset {
    let mut options = DatasetOptions::new(url);
    options.base_url = base_url;
    Dataset::with_fetcher(options, Arc::new(HttpFetcher::new(fetch.fetch_options())))
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), DataKittenError> {
    let dataset = load(args.url, args.base_url, &args.fetch);
    let summary = DatasetSummary::from_dataset(&dataset);

    match args.output {
        OutputFormat::Json => println!("{}", summary.to_json_string()?),
        OutputFormat::Text => print!("{}", summary),
    }
    Ok(())
}

/// Execute the detect subcommand.
fn run_detect(args: DetectArgs) -> Result<(), DataKittenError> {
    let dataset = load(args.url, None, &args.fetch);

    println!(
        "origin: {}",
        dataset.origin().map(|origin| origin.name()).unwrap_or("-")
    );
    println!(
        "host: {}",
        dataset.host().map(|host| host.name()).unwrap_or("-")
    );
    println!(
        "format: {}",
        dataset
            .publishing_format()
            .map(|format| format.name())
            .unwrap_or("-")
    );

    if dataset.supported() {
        println!("supported: yes");
        Ok(())
    } else {
        println!("supported: no");
        Err(DataKittenError::Unsupported {
            url: dataset.url().to_string(),
        })
    }
}
