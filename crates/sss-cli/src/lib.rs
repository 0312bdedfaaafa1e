//! # sss-cli — Operator Tool for the Stablecoin Control Plane
//!
//! Offline helpers an operator runs before a request reaches the control
//! plane: protecting KYC evidence, producing the hash that gets anchored,
//! and preparing custodian shares for threshold-guarded operations.
//!
//! ## Subcommands
//!
//! - `sss channel` — keygen, encrypt and decrypt evidence payloads
//! - `sss hash` — content hash of a file, raw or as canonical JSON
//! - `sss threshold` — split a secret into M-of-N shares, combine shares
//! - `sss preset` — show the flags a preset resolves to
//! - `sss policy` — validate and print a policy file
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; every decision is made by the library
//!   crates.
//! - Handlers return an exit code; errors propagate as `anyhow::Error`.

pub mod channel;
pub mod digest;
pub mod inspect;
pub mod threshold;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a file holding a single hex value, with surrounding whitespace
/// removed.
pub fn read_hex_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content.trim().to_string())
}

/// Write `bytes` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}
