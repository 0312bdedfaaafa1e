//! # Preset and Policy Subcommands
//!
//! Read-only views an operator checks before initializing a token.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sss_core::PolicyConfig;
use sss_issuance::{FeatureFlags, Preset};

/// Arguments for the `sss preset` subcommand.
#[derive(Args, Debug)]
pub struct PresetArgs {
    /// Preset name: sss-1, sss-2 or custom.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the `sss policy` subcommand.
#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Policy YAML file.
    #[arg(long, short)]
    pub policy: PathBuf,
}

/// Execute the preset subcommand.
pub fn run_preset(args: &PresetArgs) -> Result<u8> {
    let preset = args.name.parse::<Preset>().map_err(|e| anyhow::anyhow!(e))?;
    print!("{}", describe_preset(preset));
    Ok(0)
}

fn describe_preset(preset: Preset) -> String {
    let FeatureFlags {
        permanent_delegate,
        transfer_hook,
        default_account_frozen,
    } = preset.default_flags();
    format!(
        "Preset: {preset}\n  permanent_delegate: {permanent_delegate}\n  transfer_hook: {transfer_hook}\n  default_account_frozen: {default_account_frozen}\n  requires_treasury: {}\n",
        preset.requires_treasury()
    )
}

/// Execute the policy subcommand.
pub fn run_policy(args: &PolicyArgs) -> Result<u8> {
    let policy = PolicyConfig::load(&args.policy)
        .with_context(|| format!("invalid policy: {}", args.policy.display()))?;
    let yaml = serde_yaml::to_string(&policy).context("failed to render policy")?;
    println!("OK: {}", args.policy.display());
    print!("{yaml}");
    Ok(0)
}
