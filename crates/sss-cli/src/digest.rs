//! # Hash Subcommand
//!
//! Prints the 32-byte content hash an operator anchors in a whitelist entry
//! or a vault proof.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sss_core::{evidence_digest, Hash32};

/// Arguments for the `sss hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Parse the file as JSON and hash its canonical form, so key order and
    /// whitespace do not change the result.
    #[arg(long)]
    pub canonical: bool,
}

/// Execute the hash subcommand.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let digest = hash_file(&args.file, args.canonical)?;
    println!("{digest}");
    Ok(0)
}

fn hash_file(path: &Path, canonical: bool) -> Result<Hash32> {
    if canonical {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
        evidence_digest(&value).context("failed to canonicalize evidence")
    } else {
        let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(sss_crypto::hash(&bytes))
    }
}
