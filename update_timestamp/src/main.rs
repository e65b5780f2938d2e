//! Update Timestamp - PocketBase record touch
//!
//! Exit codes:
//! - 0: Record updated
//! - 1: Any failure (reported as a `::error::` workflow command)

use std::env;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use update_timestamp::{escape_command_data, failure_message, PocketBaseClient, RawInputs, UpdateWorkflow};

#[derive(Parser, Debug)]
#[command(name = "update_timestamp")]
#[command(about = "Set the lastUpdate field of a PocketBase record to now")]
struct Args {
    /// Base URL of the PocketBase instance
    #[arg(long, env = "INPUT_POCKETBASE-URL")]
    pocketbase_url: Option<String>,

    /// Collection holding the record
    #[arg(long, env = "INPUT_COLLECTION-ID")]
    collection_id: Option<String>,

    /// Record to update
    #[arg(long, env = "INPUT_RECORD-ID")]
    record_id: Option<String>,

    /// Owner of the repository running this job
    #[arg(long, env = "GITHUB_REPOSITORY_OWNER")]
    owner: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    let args = Args::parse();

    let exit_code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            println!("::error::{}", escape_command_data(&failure_message(&e)));
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(args: Args) -> update_timestamp::Result<()> {
    let client = PocketBaseClient::new(Duration::from_secs(args.timeout_secs))?;

    let inputs = RawInputs {
        owner: args.owner,
        pocketbase_url: args.pocketbase_url,
        collection_id: args.collection_id,
        record_id: args.record_id,
    };

    UpdateWorkflow::new(inputs, |name: &str| env::var(name).ok(), client)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Args::try_parse_from(["update_timestamp", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let args = Args::try_parse_from(["update_timestamp", "--timeout-secs", "5"]).unwrap();
        assert_eq!(args.timeout_secs, 5);

        let args = Args::try_parse_from(["update_timestamp"]).unwrap();
        assert_eq!(args.timeout_secs, 30);
    }
}
