//! CLI binary for the imds-dump crate.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use imds_dump::{
    output, InstanceMetadata, MetadataClient, MetadataError, DEFAULT_BASE_URL, DEFAULT_MAX_DEPTH,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imds-dump")]
#[command(
    author,
    version,
    about = "Dump the EC2 instance metadata tree to a JSON file"
)]
struct Cli {
    /// Fetch only this key (e.g. `placement/` or `instance-id`) instead of the whole tree
    key: Option<String>,

    /// File to write the document to
    #[arg(short, long, default_value = output::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Metadata service base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout: Option<u64>,

    /// Directory levels to descend below the starting key
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum size in bytes of a single response (larger nodes are left empty)
    #[arg(long)]
    max_size: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), MetadataError> {
    let client = MetadataClient::new(cli.timeout.map(Duration::from_secs), &cli.base_url)?;

    let imds = InstanceMetadata::from_client(client).with_max_depth(cli.max_depth);
    let imds = match cli.max_size {
        Some(size) => imds.with_max_size(size),
        None => imds,
    };

    let document = imds.dump(cli.key.as_deref()).await?;
    output::write_document(&cli.output, &document)
}
