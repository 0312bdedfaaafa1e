//! The same seizure attempt against an SSS-1 token and an SSS-2 token, then a
//! custodian quorum pausing issuance on the SSS-2 token.

use std::sync::Arc;

use sss_core::{Address, Hash32, IssuanceError, RedemptionInfo, Timestamp};
use sss_crypto::ThresholdScheme;
use sss_issuance::{
    BurnRequest, CollateralType, FeatureFlags, InMemoryLedger, IssuanceControl, IssuerType,
    MintInit, MintRequest, Preset, RoleUpdate, SeizeRequest, ThresholdGuard, TokenLedger,
    VaultInit,
};

const MASTER: Address = Address([0x01; 32]);
const OFFICER: Address = Address([0x0C; 32]);
const BANK: Address = Address([0xB0; 32]);
const HOLDER: Address = Address([0x21; 32]);
const TREASURY: Address = Address([0x7E; 32]);

fn now() -> Timestamp {
    Timestamp::parse("2026-03-02T09:00:00Z").unwrap()
}

fn token(init: MintInit) -> (IssuanceControl, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let control = IssuanceControl::initialize(
        Address::derive(b"mint", &[init.authority.as_ref()]),
        init,
        VaultInit {
            collateral_type: CollateralType::Fiat,
            auditor: None,
        },
        ledger.clone(),
        now(),
    )
    .unwrap();
    control
        .register_issuer(&MASTER, BANK, IssuerType::TrustBank, 10_000_000, 10_000_000, now())
        .unwrap();
    control
        .update_roles(
            &MASTER,
            RoleUpdate {
                compliance_officer: Some(Some(OFFICER)),
                ..RoleUpdate::default()
            },
        )
        .unwrap();
    control
        .deposit_collateral(&MASTER, 5_000_000, Hash32::from_code("wire-0001"))
        .unwrap();
    control
        .mint_tokens(
            MintRequest {
                issuer: BANK,
                recipient: HOLDER,
                amount: 1_250_000,
                reference: Hash32::from_code("wire-0002"),
            },
            now(),
        )
        .unwrap();
    (control, ledger)
}

fn seize_all() -> SeizeRequest {
    SeizeRequest {
        source: HOLDER,
        treasury: TREASURY,
        amount: 0,
        reason: Hash32::from_code("sanctions-match"),
    }
}

#[test]
fn sss1_token_cannot_be_seized() {
    let init = MintInit {
        flags: Some(FeatureFlags::ALL),
        treasury: Some(TREASURY),
        ..MintInit::sss1(MASTER, 6)
    };
    let (control, ledger) = token(init);
    assert_eq!(control.config().flags, FeatureFlags::NONE);

    control.set_account_frozen(&OFFICER, &HOLDER, true).unwrap();
    for caller in [MASTER, OFFICER] {
        assert_eq!(
            control.seize(&caller, seize_all()),
            Err(IssuanceError::PermanentDelegateNotEnabled)
        );
    }
    assert_eq!(ledger.balance_of(&HOLDER), 1_250_000);
}

#[test]
fn sss2_token_seizes_entire_frozen_balance() {
    let (control, ledger) = token(MintInit::sss2(MASTER, 6, TREASURY));
    assert_eq!(control.config().preset, Preset::Sss2);

    control.set_account_frozen(&OFFICER, &HOLDER, true).unwrap();
    let receipt = control.seize(&OFFICER, seize_all()).unwrap();
    assert_eq!(receipt.amount, 1_250_000);
    assert_eq!(receipt.seized_by, OFFICER);
    assert_eq!(ledger.balance_of(&HOLDER), 0);
    assert_eq!(ledger.balance_of(&TREASURY), 1_250_000);
    assert_eq!(control.total_supply(), 1_250_000);

    // A stranger cannot freeze or thaw.
    assert!(matches!(
        control.set_account_frozen(&Address([0x44; 32]), &HOLDER, false),
        Err(IssuanceError::Unauthorized(_))
    ));
}

#[test]
fn quorum_pause_stops_issuance_but_not_circulation() {
    let (control, ledger) = token(MintInit::sss2(MASTER, 6, TREASURY));
    let scheme = ThresholdScheme::new(3, 5).unwrap();
    let (guard, shares) = ThresholdGuard::provision(scheme, b"pause-authority").unwrap();

    let quorum = [shares[4].clone(), shares[0].clone(), shares[2].clone()];
    control.emergency_pause(&guard, &quorum, now()).unwrap();
    assert!(control.is_paused());

    let burn = BurnRequest {
        issuer: BANK,
        holder: HOLDER,
        amount: 1,
        redemption_info: RedemptionInfo::ZERO,
        reference: Hash32::ZERO,
    };
    assert_eq!(control.burn_tokens(burn, now()), Err(IssuanceError::Paused));
    ledger.transfer(&HOLDER, &TREASURY, 250_000).unwrap();

    control.unpause(&MASTER, now()).unwrap();
    let receipt = control.burn_tokens(burn, now()).unwrap();
    assert_eq!(receipt.total_supply, 1_249_999);
    assert_eq!(control.vault().total_collateral, 4_999_999);
}

#[test]
fn custom_preset_still_requires_full_backing() {
    let init = MintInit {
        preset: Preset::Custom,
        collateral_ratio_bps: 12_000,
        ..MintInit::sss1(MASTER, 6)
    };
    let result = IssuanceControl::initialize(
        Address([0x4D; 32]),
        init,
        VaultInit {
            collateral_type: CollateralType::GovernmentBond,
            auditor: None,
        },
        Arc::new(InMemoryLedger::new()),
        now(),
    );
    assert!(matches!(result, Err(IssuanceError::InvalidConfiguration(_))));
}
