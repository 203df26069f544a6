use crate::{ClaimConfig, ClaimId, SlotMask};
use alloy_primitives::{BlockNumber, B256, U256};
use alloy_sol_types::{sol, SolType, SolValue};
use serde::{Deserialize, Serialize};

sol! {
    /// A block the verified claims were read from.
    #[derive(Debug, PartialEq, Eq)]
    struct BlockRef {
        uint64 number;
        bytes32 hash;
    }

    /// Values committed by the claim program. Every configuration input the guest reads is
    /// committed, so a verifier can pin the claim it accepts.
    #[derive(Debug, PartialEq, Eq)]
    struct ClaimPublicValues {
        uint256 firstClaimId;
        uint256 lastClaimId;
        uint256 identity;
        uint256 totalAmount;
        address emitter;
        bytes32 eventSchema;
        uint64 maxClaims;
        uint64 identityOffset;
        uint64 amountOffset;
        BlockRef[] blocks;
    }
}

/// Result of a verified batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub first_claim_id: ClaimId,
    pub last_claim_id: ClaimId,
    pub identity: U256,
    pub total_amount: U256,
}

impl BatchSummary {
    /// Picks the first and the last active ids out of the masked id sequence.
    pub fn select(
        masked_ids: &[ClaimId],
        mask: &SlotMask,
        identity: U256,
        total_amount: U256,
    ) -> Self {
        Self {
            first_claim_id: masked_ids[0],
            last_claim_id: masked_ids[mask.last_active()],
            identity,
            total_amount,
        }
    }

    pub fn public_values(
        &self,
        config: &ClaimConfig,
        blocks: impl IntoIterator<Item = (BlockNumber, B256)>,
    ) -> ClaimPublicValues {
        ClaimPublicValues {
            firstClaimId: self.first_claim_id.into(),
            lastClaimId: self.last_claim_id.into(),
            identity: self.identity,
            totalAmount: self.total_amount,
            emitter: config.expected_contract,
            eventSchema: config.event_schema.unwrap_or_default(),
            maxClaims: config.max_claims as u64,
            identityOffset: config.identity_offset as u64,
            amountOffset: config.amount_offset as u64,
            blocks: blocks
                .into_iter()
                .map(|(number, hash)| BlockRef { number, hash })
                .collect(),
        }
    }
}

impl ClaimPublicValues {
    pub fn encode(&self) -> Vec<u8> {
        self.abi_encode()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, alloy_sol_types::Error> {
        <Self as SolType>::abi_decode(bytes, true)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            first_claim_id: ClaimId::from_raw(self.firstClaimId),
            last_claim_id: ClaimId::from_raw(self.lastClaimId),
            identity: self.identity,
            total_amount: self.totalAmount,
        }
    }
}
