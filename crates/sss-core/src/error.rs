//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the control plane. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every rejection is typed and non-retriable: the caller must change the
//!   request, not resubmit it unchanged.
//! - A rejected operation leaves every record unchanged. Errors are raised
//!   before the first write to a record, never after.
//! - Cryptographic failures carry no partial output and no detail that would
//!   help an attacker distinguish a wrong key from a tampered ciphertext.

use thiserror::Error;

use crate::jurisdiction::Jurisdiction;

/// Top-level error type for the control plane.
#[derive(Error, Debug)]
pub enum SssError {
    /// Registry or transfer-gate rejection.
    #[error("compliance error: {0}")]
    Compliance(#[from] ComplianceError),

    /// Issuance-control rejection.
    #[error("issuance error: {0}")]
    Issuance(#[from] IssuanceError),

    /// Confidential channel or threshold authorization failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Policy configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Canonical serialization of evidence failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Rejections raised by the compliance registry and the transfer gate.
///
/// `NotWhitelisted`, `Blacklisted`, `Expired` and `DailyLimitExceeded` are the
/// transfer denial reasons, mutually exclusive in that evaluation order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    /// No record exists at the derived address.
    #[error("{record} not found for {key}")]
    NotFound {
        /// Record kind ("whitelist entry", "blacklist entry", ...).
        record: &'static str,
        /// Hex address the lookup was made for.
        key: String,
    },

    /// The wallet has no active whitelist entry.
    #[error("wallet {wallet} is not whitelisted")]
    NotWhitelisted {
        /// Wallet that was screened.
        wallet: String,
    },

    /// The wallet has an active blacklist entry.
    #[error("wallet {wallet} is blacklisted")]
    Blacklisted {
        /// Wallet that was screened.
        wallet: String,
    },

    /// The wallet's KYC verification has expired.
    #[error("KYC verification for wallet {wallet} expired at {expired_at}")]
    Expired {
        /// Wallet that was screened.
        wallet: String,
        /// Unix seconds of the expiry.
        expired_at: i64,
    },

    /// The transfer would push the wallet past its daily limit.
    #[error("daily limit exceeded: volume {volume} + amount {amount} > limit {limit}")]
    DailyLimitExceeded {
        /// Volume already used in the current epoch.
        volume: u64,
        /// Attempted amount.
        amount: u64,
        /// Configured daily limit.
        limit: u64,
    },

    /// The jurisdiction policy refused the wallet.
    #[error("jurisdiction {jurisdiction} not allowed for {operation}")]
    JurisdictionNotAllowed {
        /// Jurisdiction of the wallet.
        jurisdiction: Jurisdiction,
        /// "enrollment" or "transfer".
        operation: &'static str,
    },

    /// The registry has been deactivated by its authority.
    #[error("compliance registry is not active")]
    RegistryInactive,

    /// The caller is not the registry authority.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Rejections raised by issuance control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// No issuer, vault or configuration record exists.
    #[error("{record} not found for {key}")]
    NotFound {
        /// Record kind.
        record: &'static str,
        /// Hex address the lookup was made for.
        key: String,
    },

    /// Mint or burn attempted while issuance is paused.
    #[error("issuance is paused")]
    Paused,

    /// Pause requested while already paused.
    #[error("issuance is already paused")]
    AlreadyPaused,

    /// Unpause requested while not paused.
    #[error("issuance is not paused")]
    NotPaused,

    /// The issuer's daily mint or burn ceiling would be exceeded.
    #[error("issuer daily {operation} limit exceeded: volume {volume} + amount {amount} > limit {limit}")]
    DailyLimitExceeded {
        /// "mint" or "burn".
        operation: &'static str,
        /// Volume already used in the current epoch.
        volume: u64,
        /// Attempted amount.
        amount: u64,
        /// Configured daily limit.
        limit: u64,
    },

    /// Minting would leave total supply above vault collateral.
    #[error("collateral insufficient: supply {supply} + amount {amount} > collateral {collateral}")]
    CollateralInsufficient {
        /// Current total supply.
        supply: u64,
        /// Attempted mint amount.
        amount: u64,
        /// Current vault collateral.
        collateral: u64,
    },

    /// A collateral withdrawal would break 100% backing.
    #[error("collateral ratio violation: collateral {collateral} would fall below supply {supply}")]
    CollateralRatioViolation {
        /// Collateral after the withdrawal.
        collateral: u64,
        /// Current total supply.
        supply: u64,
    },

    /// Burn amount exceeds total supply.
    #[error("insufficient supply to burn {amount} (supply {supply})")]
    InsufficientSupply {
        /// Attempted amount.
        amount: u64,
        /// Current total supply.
        supply: u64,
    },

    /// Holder balance is below the requested amount.
    #[error("insufficient balance: {balance} < {amount}")]
    InsufficientBalance {
        /// Holder balance.
        balance: u64,
        /// Requested amount.
        amount: u64,
    },

    /// Seizure attempted without the permanent-delegate capability.
    #[error("permanent delegate not enabled: seizure requires an SSS-2 or delegate-enabled configuration")]
    PermanentDelegateNotEnabled,

    /// Seizure attempted without a configured treasury, or to a different one.
    #[error("treasury not configured or does not match")]
    TreasuryNotConfigured,

    /// Seizure source account is not frozen.
    #[error("account {0} must be frozen before seizure")]
    AccountNotFrozen(String),

    /// The token account is frozen and cannot send, receive or burn.
    #[error("account {0} is frozen")]
    AccountFrozen(String),

    /// Issuer has been deactivated.
    #[error("issuer {0} is inactive")]
    IssuerInactive(String),

    /// Collateral vault is not accepting operations.
    #[error("collateral vault is {0}")]
    VaultInactive(String),

    /// Amount must be greater than zero.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// The mint/burn reference has already been used.
    #[error("reference {0} has already been processed")]
    DuplicateReference(String),

    /// The caller does not hold the required role.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Constructor-time validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Arithmetic would overflow a `u64` counter.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Authenticated decryption failed. Never partially succeeds.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Fewer shares than the threshold were supplied.
    #[error("insufficient shares: need {threshold}, got {supplied}")]
    InsufficientShares {
        /// Shares required.
        threshold: u8,
        /// Shares supplied.
        supplied: usize,
    },

    /// Invalid threshold/share counts or malformed input lengths.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Reconstructed shares did not match the committed authorization secret.
    #[error("threshold authorization failed")]
    AuthorizationFailed,

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

/// Error loading a policy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document is malformed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but violates a policy rule.
    #[error("invalid policy: {0}")]
    Invalid(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical evidence; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
