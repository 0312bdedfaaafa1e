//! # Counterparty Exchange Scenarios
//!
//! End-to-end flows an operator runs out-of-band: encrypt a KYC record for a
//! counterparty and anchor its hash, and recover a split authorization secret
//! from any quorum of custodians.

use sss_core::CryptoError;
use sss_crypto::{hash, ChannelKeypair, EncryptedPayload, ShamirShare, ThresholdScheme};

#[test]
fn kyc_payload_exchange_anchors_stable_hash() {
    let issuer_desk = ChannelKeypair::generate();
    let exchange_desk = ChannelKeypair::generate();
    let record = br#"{"subject":"holder-77","document":"passport"}"#;

    let payload = issuer_desk
        .encrypt(record, &exchange_desk.public_key())
        .unwrap();
    let anchored = payload.content_hash();

    // The counterparty receives the wire bytes and re-derives the anchor.
    let received = EncryptedPayload::from_bytes(&payload.to_bytes()).unwrap();
    assert_eq!(received.content_hash(), anchored);
    assert_eq!(exchange_desk.decrypt(&received).unwrap(), record.to_vec());

    // The anchor is not the hash of the plaintext.
    assert_ne!(anchored, hash(record));
}

#[test]
fn every_three_of_five_quorum_recovers_the_secret() {
    let scheme = ThresholdScheme::new(3, 5).unwrap();
    let secret = b"emergency-pause-authorization-key".to_vec();
    let shares = scheme.split(&secret).unwrap();
    assert_eq!(shares.len(), 5);

    let mut quorums = 0;
    for a in 0..5 {
        for b in (a + 1)..5 {
            for c in (b + 1)..5 {
                let subset = vec![shares[a].clone(), shares[b].clone(), shares[c].clone()];
                let recovered = scheme.reconstruct(&subset).unwrap();
                assert_eq!(recovered.as_slice(), secret.as_slice());
                quorums += 1;
            }
        }
    }
    assert_eq!(quorums, 10);
}

#[test]
fn two_custodians_cannot_reach_quorum() {
    let scheme = ThresholdScheme::new(3, 5).unwrap();
    let shares = scheme.split(b"secret").unwrap();
    let err = scheme.reconstruct(&shares[..2]).unwrap_err();
    assert_eq!(
        err,
        CryptoError::InsufficientShares {
            threshold: 3,
            supplied: 2
        }
    );
}

#[test]
fn shares_travel_in_encoded_form() {
    let scheme = ThresholdScheme::new(2, 3).unwrap();
    let shares = scheme.split(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
    let encoded: Vec<String> = shares.iter().map(ShamirShare::to_encoded).collect();
    let decoded: Vec<ShamirShare> = encoded
        .iter()
        .rev()
        .take(2)
        .map(|s| s.parse().unwrap())
        .collect();
    let recovered = scheme.reconstruct(&decoded).unwrap();
    assert_eq!(recovered.as_slice(), &[0xde, 0xad, 0xbe, 0xef]);
}
