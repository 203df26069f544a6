#![cfg(feature = "random")]

use alloy_primitives::{address, Address, U256};
use claim_lib::testing::{oracle_for, ClaimFactory, GeneratedClaim};
use claim_lib::{
    verify_batch, Batch, Claim, ClaimConfig, ClaimError, ClaimId, ClaimInput, LogCoordinates,
    MapOracle, Mismatch, OracleError, ResolvedLog, WitnessOracle, MAX_CLAIMS,
};
use rand::{rngs::StdRng, SeedableRng};
use std::str::FromStr;

fn factory(seed: u64) -> ClaimFactory<StdRng> {
    ClaimFactory::new(ClaimConfig::default(), StdRng::seed_from_u64(seed))
}

/// `active` claims followed by padding slots that reuse distinct extra claims of the same
/// claimant.
fn batch_of(claims: &[GeneratedClaim], active: usize) -> Batch {
    let coordinates: Vec<Claim> = claims.iter().map(|c| c.coordinates.into()).collect();
    let mut batch = Batch::padded(&coordinates[..active], MAX_CLAIMS).unwrap();
    for (slot, claim) in coordinates.iter().enumerate().skip(active).take(MAX_CLAIMS) {
        batch.set_claim(slot, *claim);
    }
    batch
}

fn id(claim: &GeneratedClaim) -> ClaimId {
    ClaimId::from_coordinates(claim.coordinates)
}

#[test]
fn every_claim_count_verifies() {
    let config = ClaimConfig::default();
    for k in 1..=MAX_CLAIMS {
        let mut factory = factory(k as u64);
        let claims = factory.claims(MAX_CLAIMS);
        let batch = batch_of(&claims, k);

        let summary = verify_batch(&batch, &config, &oracle_for(&claims)).unwrap();
        let expected_total = claims[..k].iter().map(|c| c.amount).sum::<U256>();

        assert_eq!(summary.first_claim_id, id(&claims[0]));
        assert_eq!(summary.last_claim_id, id(&claims[k - 1]));
        assert_eq!(summary.identity, factory.identity);
        assert_eq!(summary.total_amount, expected_total);
    }
}

#[test]
fn witness_oracle_agrees_with_trusted_logs() {
    let config = ClaimConfig::default();
    let mut factory = factory(99);
    let claims = factory.claims(4);
    let batch = Batch::padded(
        &claims.iter().map(|c| c.coordinates.into()).collect::<Vec<Claim>>(),
        MAX_CLAIMS,
    )
    .unwrap();

    let trusted = verify_batch(&batch, &config, &oracle_for(&claims)).unwrap();
    let proven = verify_batch(&batch, &config, &WitnessOracle::new(factory.witnesses())).unwrap();
    assert_eq!(trusted, proven);

    let values = ClaimInput {
        batch,
        config: config.clone(),
        witnesses: factory.witnesses(),
    }
    .verify()
    .unwrap();
    assert_eq!(values.summary(), proven);
    assert_eq!(values.emitter, config.expected_contract);
    assert_eq!(values.blocks.len(), 4);
}

#[test]
fn swapped_active_slots_are_out_of_order() {
    let claims = factory(1).claims(MAX_CLAIMS);
    let mut batch = batch_of(&claims, 5);
    batch.set_claim(2, claims[3].coordinates.into());
    batch.set_claim(3, claims[2].coordinates.into());

    let err = verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)).unwrap_err();
    assert_eq!(
        err,
        ClaimError::OrderingViolation {
            slot: 3,
            previous: id(&claims[3]),
            current: id(&claims[2]),
        }
    );
}

#[test]
fn duplicated_active_claim_is_rejected() {
    let claims = factory(2).claims(MAX_CLAIMS);
    let mut batch = batch_of(&claims, 3);
    batch.set_claim(1, claims[0].coordinates.into());

    let err = verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)).unwrap_err();
    assert!(matches!(err, ClaimError::OrderingViolation { slot: 1, .. }));
}

#[test]
fn padding_order_is_irrelevant() {
    let claims = factory(3).claims(MAX_CLAIMS);
    let mut batch = batch_of(&claims, 2);
    // padding reversed and duplicated
    for slot in 2..MAX_CLAIMS {
        batch.set_claim(slot, claims[MAX_CLAIMS + 1 - slot].coordinates.into());
    }
    batch.set_claim(9, claims[0].coordinates.into());

    assert!(verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)).is_ok());
}

#[test]
fn claim_count_out_of_range() {
    let claims = factory(4).claims(MAX_CLAIMS);
    for num_claims in [0u64, 11] {
        let mut batch = batch_of(&claims, 1);
        batch.num_claims = U256::from(num_claims);

        assert_eq!(
            verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)),
            Err(ClaimError::RangeViolation {
                num_claims: U256::from(num_claims),
                max_claims: MAX_CLAIMS,
            })
        );
    }
}

#[test]
fn shape_is_checked_before_claim_count() {
    let claims = factory(5).claims(MAX_CLAIMS);
    let mut batch = batch_of(&claims, 1);
    batch.num_claims = U256::ZERO;
    batch.block_numbers.truncate(9);

    assert_eq!(
        verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)),
        Err(ClaimError::InputShape {
            field: "blockNumbers",
            actual: 9,
            expected: MAX_CLAIMS,
        })
    );
}

#[test]
fn oversized_padding_coordinate_fails_encoding() {
    let claims = factory(6).claims(MAX_CLAIMS);
    let mut batch = batch_of(&claims, 1);
    batch.log_indices[7] = U256::from(1) << 64;

    assert!(matches!(
        verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)),
        Err(ClaimError::EncodingOverflow {
            slot: 7,
            field: "logIndex",
            ..
        })
    ));
}

#[test]
fn foreign_emitter_is_rejected_on_any_slot() {
    const IMPOSTOR: Address = address!("00000000000000000000000000000000deadbeef");

    for slot in [0, 4, 9] {
        let claims = factory(7).claims(MAX_CLAIMS);
        let batch = batch_of(&claims, 5);
        let mut oracle = oracle_for(&claims);
        oracle.get_mut(&claims[slot].coordinates).unwrap().emitter = IMPOSTOR;

        assert_eq!(
            verify_batch(&batch, &ClaimConfig::default(), &oracle),
            Err(ClaimError::ProvenanceMismatch {
                slot,
                reason: Mismatch::Emitter {
                    expected: ClaimConfig::default().expected_contract,
                    found: IMPOSTOR,
                },
            })
        );
    }
}

#[test]
fn foreign_emitter_from_proven_receipt_is_rejected() {
    let mut factory = factory(8);
    let mut claims = factory.claims(2);
    factory.emitter = Address::repeat_byte(0x77);
    claims.push(factory.claim());

    let coordinates: Vec<Claim> = claims.iter().map(|c| c.coordinates.into()).collect();
    let batch = Batch::padded(&coordinates, MAX_CLAIMS).unwrap();
    let oracle = WitnessOracle::new(factory.witnesses());

    assert!(matches!(
        verify_batch(&batch, &ClaimConfig::default(), &oracle),
        Err(ClaimError::ProvenanceMismatch {
            slot: 2,
            reason: Mismatch::Emitter { .. },
        })
    ));
}

#[test]
fn identity_must_match_on_active_and_padding_slots() {
    for slot in [3, 8] {
        let mut factory = factory(9);
        let mut claims = factory.claims(slot);
        let identity = factory.identity;
        factory.identity = identity + U256::from(1);
        claims.extend(factory.claims(MAX_CLAIMS - slot));

        let batch = batch_of(&claims, 5);
        assert_eq!(
            verify_batch(&batch, &ClaimConfig::default(), &oracle_for(&claims)),
            Err(ClaimError::IdentityMismatch {
                slot,
                expected: identity,
                found: identity + U256::from(1),
            })
        );
    }
}

#[test]
fn only_active_amounts_are_summed() {
    let config = ClaimConfig::default();
    let claims = factory(10).claims(MAX_CLAIMS);
    let batch = batch_of(&claims, 4);
    let baseline = verify_batch(&batch, &config, &oracle_for(&claims))
        .unwrap()
        .total_amount;

    let with_amount = |slot: usize, amount: U256| {
        let mut oracle = oracle_for(&claims);
        let log = oracle.get_mut(&claims[slot].coordinates).unwrap();
        let mut data = log.data.to_vec();
        data[config.amount_offset * 32..][..32].copy_from_slice(&amount.to_be_bytes::<32>());
        log.data = data.into();
        verify_batch(&batch, &config, &oracle).unwrap().total_amount
    };

    assert_eq!(with_amount(6, U256::from(123_456_789)), baseline);
    assert_eq!(
        with_amount(2, claims[2].amount + U256::from(1_000)),
        baseline + U256::from(1_000)
    );
}

#[test]
fn unresolvable_padding_slot_fails_the_batch() {
    let claims = factory(11).claims(MAX_CLAIMS);
    let batch = batch_of(&claims, 2);
    let oracle: MapOracle = oracle_for(&claims[..MAX_CLAIMS - 1]);

    assert_eq!(
        verify_batch(&batch, &ClaimConfig::default(), &oracle),
        Err(ClaimError::OracleResolutionFailure {
            slot: 9,
            coordinates: claims[9].coordinates,
            source: OracleError::NotFound(claims[9].coordinates),
        })
    );
}

#[test]
fn single_claim_repeated_in_every_slot() {
    let coordinates = LogCoordinates::new(11568267, 3, 2);
    let config = ClaimConfig::default();

    let mut data = vec![0u8; 10 * 32];
    data[config.identity_offset * 32 + 31] = 0xaa;
    let fee = U256::from(108_872_000_000_000_000u64);
    data[config.amount_offset * 32..][..32].copy_from_slice(&fee.to_be_bytes::<32>());
    let oracle: MapOracle = [(
        coordinates,
        ResolvedLog {
            emitter: config.expected_contract,
            topics: config.event_schema.into_iter().collect(),
            data: data.into(),
        },
    )]
    .into_iter()
    .collect();

    let batch: Batch = serde_json::from_str(
        r#"{
            "blockNumbers": ["11568267", "11568267", "11568267", "11568267", "11568267",
                             "11568267", "11568267", "11568267", "11568267", "11568267"],
            "txIdxs": ["3", "3", "3", "3", "3", "3", "3", "3", "3", "3"],
            "logIdxs": ["2", "2", "2", "2", "2", "2", "2", "2", "2", "2"],
            "numClaims": "1"
        }"#,
    )
    .unwrap();

    let summary = verify_batch(&batch, &config, &oracle).unwrap();
    let expected = U256::from_str("0xb0848b00000000000000030000000000000002").unwrap();
    assert_eq!(*summary.first_claim_id, expected);
    assert_eq!(*summary.last_claim_id, expected);
    assert_eq!(summary.identity, U256::from(0xaa));
    assert_eq!(summary.total_amount, fee);
}

#[test]
fn committed_values_reveal_the_amount_word() {
    let mut factory = factory(12);
    let claims = factory.claims(1);
    let batch = batch_of(&claims, 1);
    let verify = |config: ClaimConfig| {
        ClaimInput {
            batch: batch.clone(),
            config,
            witnesses: factory.witnesses(),
        }
        .verify()
    };

    let honest = verify(ClaimConfig::default()).unwrap();
    assert_eq!(honest.amountOffset, 9);
    assert_eq!(honest.totalAmount, claims[0].amount);

    // word 8 of the same event passes every check but is a different claim
    let other = verify(ClaimConfig {
        amount_offset: 8,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(other.amountOffset, 8);
    assert_ne!(other.encode(), honest.encode());
}
