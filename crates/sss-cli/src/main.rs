//! # sss CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sss_cli::channel::{run_channel, ChannelArgs};
use sss_cli::digest::{run_hash, HashArgs};
use sss_cli::inspect::{run_policy, run_preset, PolicyArgs, PresetArgs};
use sss_cli::threshold::{run_threshold, ThresholdArgs};

/// Stablecoin control-plane operator tool.
///
/// Seals KYC evidence for a counterparty, hashes evidence for anchoring,
/// manages custodian threshold shares and checks presets and policy files.
#[derive(Parser, Debug)]
#[command(name = "sss", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Confidential channel: keygen, encrypt, decrypt.
    Channel(ChannelArgs),

    /// SHA-256 content hash of a file.
    Hash(HashArgs),

    /// Threshold secret sharing: split, combine.
    Threshold(ThresholdArgs),

    /// Show the flags a compliance preset resolves to.
    Preset(PresetArgs),

    /// Validate and print a policy file.
    Policy(PolicyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("sss CLI starting");

    let result = match cli.command {
        Commands::Channel(args) => run_channel(&args),
        Commands::Hash(args) => run_hash(&args),
        Commands::Threshold(args) => run_threshold(&args),
        Commands::Preset(args) => run_preset(&args),
        Commands::Policy(args) => run_policy(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
