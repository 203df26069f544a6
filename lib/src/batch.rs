use crate::{Claim, ClaimError, ClaimId};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Fixed-capacity set of claims submitted for one verification pass, in the column layout the
/// claim is submitted with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub block_numbers: Vec<U256>,
    #[serde(alias = "txIdxs")]
    pub tx_indices: Vec<U256>,
    #[serde(alias = "logIdxs")]
    pub log_indices: Vec<U256>,
    pub num_claims: U256,
}

impl Batch {
    /// Lays out `claims` as the active prefix of a `capacity` slot batch, filling the remaining
    /// slots with copies of the first claim. `None` when there is no claim to pad with.
    pub fn padded(claims: &[Claim], capacity: usize) -> Option<Self> {
        let filler = *claims.first()?;
        let slots = claims
            .iter()
            .copied()
            .chain(std::iter::repeat(filler))
            .take(capacity.max(claims.len()));

        let mut batch = Self {
            num_claims: U256::from(claims.len()),
            ..Self::default()
        };
        for claim in slots {
            batch.block_numbers.push(claim.block_number);
            batch.tx_indices.push(claim.tx_index);
            batch.log_indices.push(claim.log_index);
        }
        Some(batch)
    }

    pub fn claim(&self, slot: usize) -> Option<Claim> {
        Some(Claim {
            block_number: *self.block_numbers.get(slot)?,
            tx_index: *self.tx_indices.get(slot)?,
            log_index: *self.log_indices.get(slot)?,
        })
    }

    /// Claims slot by slot, as far as all three columns reach.
    pub fn claims(&self) -> impl Iterator<Item = Claim> + '_ {
        self.block_numbers
            .iter()
            .zip(&self.tx_indices)
            .zip(&self.log_indices)
            .map(|((block_number, tx_index), log_index)| Claim {
                block_number: *block_number,
                tx_index: *tx_index,
                log_index: *log_index,
            })
    }

    pub fn set_claim(&mut self, slot: usize, claim: Claim) {
        self.block_numbers[slot] = claim.block_number;
        self.tx_indices[slot] = claim.tx_index;
        self.log_indices[slot] = claim.log_index;
    }

    pub fn check_shape(&self, capacity: usize) -> Result<(), ClaimError> {
        for (field, actual) in [
            ("blockNumbers", self.block_numbers.len()),
            ("txIndices", self.tx_indices.len()),
            ("logIndices", self.log_indices.len()),
        ] {
            if actual != capacity {
                return Err(ClaimError::InputShape {
                    field,
                    actual,
                    expected: capacity,
                });
            }
        }
        Ok(())
    }
}

/// Positional active/padding split of a batch: slots `[0, num_claims)` are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMask {
    num_claims: usize,
    capacity: usize,
}

impl SlotMask {
    pub fn new(num_claims: U256, capacity: usize) -> Result<Self, ClaimError> {
        if num_claims.is_zero() || num_claims > U256::from(capacity) {
            return Err(ClaimError::RangeViolation {
                num_claims,
                max_claims: capacity,
            });
        }
        Ok(Self {
            num_claims: num_claims.to::<u64>() as usize,
            capacity,
        })
    }

    pub fn num_claims(&self) -> usize {
        self.num_claims
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_active(&self, slot: usize) -> bool {
        slot < self.num_claims
    }

    pub fn last_active(&self) -> usize {
        self.num_claims - 1
    }

    /// Padding slots are forced to the zero sentinel.
    pub fn mask(&self, slot: usize, id: ClaimId) -> ClaimId {
        if self.is_active(slot) {
            id
        } else {
            ClaimId::ZERO
        }
    }
}
