//! Offline Rekor proof verifier
//!
//! Checks inclusion and consistency proofs from responses saved off a Rekor
//! V1 server, without contacting the log.

mod commands;

use clap::{Parser, Subcommand};
use rekor_merkle::ErrorKind;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rekor-verify")]
#[command(about = "Verify Rekor transparency log proofs offline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the inclusion proof of a log entry
    Inclusion {
        /// Saved response of GET /api/v1/log/entries
        #[arg(long)]
        entry: PathBuf,
    },
    /// Verify that the log grew append-only since a trusted checkpoint
    Consistency {
        /// Tree ID of the trusted checkpoint
        #[arg(long)]
        tree_id: String,

        /// Tree size of the trusted checkpoint
        #[arg(long)]
        tree_size: u64,

        /// Root hash of the trusted checkpoint (hex)
        #[arg(long)]
        root_hash: String,

        /// Saved response of GET /api/v1/log
        #[arg(long)]
        latest: PathBuf,

        /// Saved response of GET /api/v1/log/proof
        #[arg(long)]
        proof: PathBuf,
    },
    /// Cross-check a log info response against its signed tree head
    Checkpoint {
        /// Saved response of GET /api/v1/log
        #[arg(long)]
        log_info: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Inclusion { entry } => {
            let entry = commands::read_entry(&entry)?;
            commands::inclusion(&entry)?;
            println!("Offline root hash calculation for inclusion verified");
        }
        Commands::Consistency {
            tree_id,
            tree_size,
            root_hash,
            latest,
            proof,
        } => {
            let previous = commands::previous_checkpoint(tree_id, tree_size, &root_hash)?;
            let latest = commands::read_json(&latest)?;
            let proof = commands::read_json(&proof)?;
            commands::consistency(&previous, &latest, &proof)?;
            println!("Consistency verification successful");
        }
        Commands::Checkpoint { log_info } => {
            let info = commands::read_json(&log_info)?;
            println!("{}", commands::checkpoint(&info)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli.command) {
        match commands::failure_kind(&e) {
            Some(ErrorKind::Mismatch) => eprintln!("Verification failed: {:#}", e),
            Some(ErrorKind::Structural) => eprintln!("Invalid proof data: {:#}", e),
            None => eprintln!("Error: {:#}", e),
        }
        process::exit(1);
    }
}
