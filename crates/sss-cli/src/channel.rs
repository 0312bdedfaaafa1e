//! # Channel Subcommand
//!
//! Keypair generation and authenticated encryption of KYC evidence between
//! compliance counterparties.
//!
//! ## Security Invariant
//!
//! Decryption either yields the full plaintext or fails; nothing is written
//! on failure. Secret keys are only ever written to the `.key` file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use sss_crypto::{ChannelKeypair, ChannelPublicKey, EncryptedPayload};

/// Arguments for the `sss channel` subcommand.
#[derive(Args, Debug)]
pub struct ChannelArgs {
    #[command(subcommand)]
    pub command: ChannelCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    /// Generate a channel keypair.
    Keygen {
        /// Output directory for the keypair files.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Prefix for the key filenames.
        #[arg(long, default_value = "sss")]
        prefix: String,
    },

    /// Encrypt a file for a recipient.
    Encrypt {
        /// Sender secret key file (hex).
        #[arg(long)]
        key: PathBuf,
        /// Recipient public key (hex).
        #[arg(long)]
        recipient: String,
        /// Plaintext file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write the JSON payload here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Decrypt a JSON payload addressed to this key.
    Decrypt {
        /// Recipient secret key file (hex).
        #[arg(long)]
        key: PathBuf,
        /// Require the payload to come from this sender (hex public key).
        #[arg(long)]
        sender: Option<String>,
        /// JSON payload file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write the plaintext here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Execute the channel subcommand.
pub fn run_channel(args: &ChannelArgs) -> Result<u8> {
    match &args.command {
        ChannelCommand::Keygen { output, prefix } => cmd_keygen(output, prefix),
        ChannelCommand::Encrypt {
            key,
            recipient,
            file,
            output,
        } => cmd_encrypt(key, recipient, file, output.as_deref()),
        ChannelCommand::Decrypt {
            key,
            sender,
            file,
            output,
        } => cmd_decrypt(key, sender.as_deref(), file, output.as_deref()),
    }
}

fn load_keypair(path: &Path) -> Result<ChannelKeypair> {
    if !path.exists() {
        bail!("secret key file not found: {}", path.display());
    }
    let hex = crate::read_hex_file(path)?;
    ChannelKeypair::from_secret_hex(&hex).map_err(|e| anyhow::anyhow!("invalid secret key: {e}"))
}

fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create output directory: {}", output_dir.display())
    })?;

    let keypair = ChannelKeypair::generate();
    let public_hex = keypair.public_key().to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));
    std::fs::write(&key_path, hex::encode(keypair.secret_bytes()))
        .with_context(|| format!("failed to write secret key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &public_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated channel keypair");
    println!("  Secret key: {}", key_path.display());
    println!("  Public key: {}", pub_path.display());
    println!("  Public key (hex): {public_hex}");
    Ok(0)
}

fn cmd_encrypt(key: &Path, recipient: &str, file: &Path, output: Option<&Path>) -> Result<u8> {
    let keypair = load_keypair(key)?;
    let recipient = ChannelPublicKey::from_hex(recipient.trim())
        .map_err(|e| anyhow::anyhow!("invalid recipient public key: {e}"))?;
    let plaintext =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    let payload = keypair
        .encrypt(&plaintext, &recipient)
        .map_err(|e| anyhow::anyhow!("encryption failed: {e}"))?;
    tracing::info!(content_hash = %payload.content_hash(), bytes = plaintext.len(), "payload sealed");

    let json = serde_json::to_vec_pretty(&payload).context("failed to serialize payload")?;
    crate::write_output(output, &json)?;
    if output.is_none() {
        println!();
    }
    Ok(0)
}

fn cmd_decrypt(key: &Path, sender: Option<&str>, file: &Path, output: Option<&Path>) -> Result<u8> {
    let keypair = load_keypair(key)?;
    let content =
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let payload: EncryptedPayload =
        serde_json::from_str(&content).with_context(|| format!("invalid payload: {}", file.display()))?;

    let result = match sender {
        Some(sender) => {
            let expected = ChannelPublicKey::from_hex(sender.trim())
                .map_err(|e| anyhow::anyhow!("invalid sender public key: {e}"))?;
            keypair.decrypt_from(&payload, &expected)
        }
        None => keypair.decrypt(&payload),
    };
    match result {
        Ok(plaintext) => {
            crate::write_output(output, &plaintext)?;
            Ok(0)
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            Ok(1)
        }
    }
}
