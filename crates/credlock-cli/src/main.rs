//! credlock CLI - hash and check credentials from a terminal.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use credlock_core::{Algorithm, CredentialHasher, HasherConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Outcome;

/// credlock - one-way credential hashing
#[derive(Parser, Debug)]
#[command(name = "credlock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON hasher configuration file
    #[arg(long, env = "CREDLOCK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Algorithm for new credentials (bcrypt, argon2id)
    #[arg(long, env = "CREDLOCK_ALGORITHM", global = true)]
    algorithm: Option<Algorithm>,

    /// bcrypt cost (log2 rounds, 4..=31)
    #[arg(long, env = "CREDLOCK_BCRYPT_COST", global = true)]
    bcrypt_cost: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash the secret read from stdin and print the credential
    Hash,

    /// Check the secret read from stdin against a credential
    Verify {
        /// Stored credential token
        #[arg(short, long)]
        credential: String,
    },

    /// Show algorithm and cost of a credential
    Inspect {
        /// Stored credential token
        credential: String,
    },

    /// Find the cost that takes at least the target time on this machine
    Calibrate {
        /// Target duration of one hash, in milliseconds
        #[arg(long, default_value_t = 250)]
        target_ms: u64,

        /// Save the calibrated configuration to this file
        #[arg(long)]
        write_config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("credlock={log_level},credlock_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = commands::load_config(cli.config.as_deref(), cli.algorithm, cli.bcrypt_cost)?;
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    match cli.command {
        Commands::Hash => commands::hash(&build_hasher(config)?, &mut input, &mut output),
        Commands::Verify { credential } => {
            commands::verify(&build_hasher(config)?, &credential, &mut input, &mut output)
        }
        Commands::Inspect { credential } => {
            commands::inspect(&build_hasher(config)?, &credential, &mut output)
        }
        Commands::Calibrate {
            target_ms,
            write_config,
        } => commands::calibrate(&config, target_ms, write_config.as_deref(), &mut output),
    }
}

fn build_hasher(config: HasherConfig) -> anyhow::Result<CredentialHasher> {
    CredentialHasher::new(config).context("cannot build hasher")
}
