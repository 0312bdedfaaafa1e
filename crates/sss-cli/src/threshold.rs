//! # Threshold Subcommand
//!
//! Splits a custodian secret into M-of-N shares for distribution and
//! recombines shares when a quorum convenes.
//!
//! ## Security Invariant
//!
//! Shares are printed once and never written to disk by this tool. The
//! secret read for splitting and the reconstructed secret are both held in
//! zeroizing memory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use sss_crypto::{ShamirShare, ThresholdScheme};
use zeroize::Zeroizing;

/// Arguments for the `sss threshold` subcommand.
#[derive(Args, Debug)]
pub struct ThresholdArgs {
    #[command(subcommand)]
    pub command: ThresholdCommand,
}

#[derive(Subcommand, Debug)]
pub enum ThresholdCommand {
    /// Split a secret into shares, one `<index>:<hex>` per line.
    Split {
        /// Shares required to reconstruct.
        #[arg(long, short)]
        threshold: u8,
        /// Shares to produce.
        #[arg(long, short = 'n')]
        shares: u8,
        /// Secret as hex.
        #[arg(long, conflicts_with = "secret_file")]
        secret_hex: Option<String>,
        /// File whose raw bytes are the secret.
        #[arg(long)]
        secret_file: Option<PathBuf>,
    },

    /// Combine shares and print the secret as hex.
    Combine {
        /// Shares required to reconstruct.
        #[arg(long, short)]
        threshold: u8,
        /// Shares as `<index>:<hex>`.
        #[arg(value_name = "SHARE", required = true)]
        shares: Vec<String>,
    },
}

/// Execute the threshold subcommand.
pub fn run_threshold(args: &ThresholdArgs) -> Result<u8> {
    match &args.command {
        ThresholdCommand::Split {
            threshold,
            shares,
            secret_hex,
            secret_file,
        } => {
            let secret = read_secret(secret_hex.as_deref(), secret_file.as_ref())?;
            for share in split(*threshold, *shares, &secret)? {
                println!("{}", share.to_encoded());
            }
            Ok(0)
        }
        ThresholdCommand::Combine { threshold, shares } => {
            let secret = combine(*threshold, shares)?;
            println!("{}", hex::encode(secret.as_slice()));
            Ok(0)
        }
    }
}

fn read_secret(
    secret_hex: Option<&str>,
    secret_file: Option<&PathBuf>,
) -> Result<Zeroizing<Vec<u8>>> {
    let secret = match (secret_hex, secret_file) {
        (Some(h), None) => hex::decode(h.trim()).context("secret is not valid hex")?,
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        _ => bail!("exactly one of --secret-hex or --secret-file is required"),
    };
    Ok(Zeroizing::new(secret))
}

fn split(threshold: u8, total: u8, secret: &[u8]) -> Result<Vec<ShamirShare>> {
    let scheme = ThresholdScheme::new(threshold, total)
        .map_err(|e| anyhow::anyhow!("invalid threshold scheme: {e}"))?;
    let shares = scheme
        .split(secret)
        .map_err(|e| anyhow::anyhow!("split failed: {e}"))?;
    tracing::info!(threshold, total, "secret split");
    Ok(shares)
}

fn combine(threshold: u8, encoded: &[String]) -> Result<Zeroizing<Vec<u8>>> {
    let shares = encoded
        .iter()
        .map(|s| {
            s.parse::<ShamirShare>()
                .map_err(|e| anyhow::anyhow!("invalid share {s:?}: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;
    // The share count N is not recorded in a share, so accept any index.
    let scheme = ThresholdScheme::new(threshold, u8::MAX)
        .map_err(|e| anyhow::anyhow!("invalid threshold: {e}"))?;
    scheme
        .reconstruct(&shares)
        .map_err(|e| anyhow::anyhow!("reconstruction failed: {e}"))
}
