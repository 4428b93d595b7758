//! parcel - inspect, verify and create signed bundle items

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use parcel_proto::MAX_TAG_BLOCK_SIZE;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::CreateArgs;
use error::CliError;

/// parcel - signed bundle item tool
#[derive(Parser, Debug)]
#[command(name = "parcel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Largest tag block accepted, in bytes
    #[arg(long, global = true, env = "PARCEL_MAX_TAG_BLOCK", default_value_t = MAX_TAG_BLOCK_SIZE)]
    max_tag_block: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an item's structure and print it as JSON
    Inspect {
        /// Item file
        file: PathBuf,
    },

    /// Print an item's identifier
    Id {
        /// Item file
        file: PathBuf,
    },

    /// Validate an item's structure and signature
    Verify {
        /// Item file
        file: PathBuf,
    },

    /// Build and sign a new item with an Ed25519 key
    Create(CreateArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let validator = commands::validator(cli.max_tag_block);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Inspect { file } => commands::inspect(&file, &validator, &mut out),
        Command::Id { file } => commands::id(&file, &validator, &mut out),
        Command::Verify { file } => commands::verify(&file, &validator, &mut out).await,
        Command::Create(args) => commands::create(&args, cli.max_tag_block, &mut out).await,
    }
}
