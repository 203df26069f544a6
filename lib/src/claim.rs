use crate::ClaimError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

const COORDINATE_BITS: usize = 64;
const TX_INDEX_SHIFT: usize = COORDINATE_BITS;
const BLOCK_NUMBER_SHIFT: usize = 2 * COORDINATE_BITS;

/// One candidate event reference as submitted, before any range checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub block_number: U256,
    pub tx_index: U256,
    pub log_index: U256,
}

impl Claim {
    pub fn new(block_number: u64, tx_index: u64, log_index: u64) -> Self {
        Self {
            block_number: U256::from(block_number),
            tx_index: U256::from(tx_index),
            log_index: U256::from(log_index),
        }
    }

    /// Range checks every component, `slot` is only used to locate the error.
    pub fn coordinates(&self, slot: usize) -> Result<LogCoordinates, ClaimError> {
        Ok(LogCoordinates {
            block_number: narrow(slot, "blockNumber", self.block_number)?,
            tx_index: narrow(slot, "txIndex", self.tx_index)?,
            log_index: narrow(slot, "logIndex", self.log_index)?,
        })
    }

    pub fn encode(&self, slot: usize) -> Result<ClaimId, ClaimError> {
        self.coordinates(slot).map(ClaimId::from_coordinates)
    }
}

impl From<LogCoordinates> for Claim {
    fn from(coordinates: LogCoordinates) -> Self {
        Self::new(
            coordinates.block_number,
            coordinates.tx_index,
            coordinates.log_index,
        )
    }
}

fn narrow(slot: usize, field: &'static str, value: U256) -> Result<u64, ClaimError> {
    if value > U256::from(u64::MAX) {
        return Err(ClaimError::EncodingOverflow { slot, field, value });
    }
    Ok(value.to::<u64>())
}

/// Address of a single log: block, transaction within the block, log within the receipt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct LogCoordinates {
    pub block_number: u64,
    pub tx_index: u64,
    pub log_index: u64,
}

impl LogCoordinates {
    pub const fn new(block_number: u64, tx_index: u64, log_index: u64) -> Self {
        Self {
            block_number,
            tx_index,
            log_index,
        }
    }
}

impl fmt::Display for LogCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} tx {} log {}",
            self.block_number, self.tx_index, self.log_index
        )
    }
}

/// Composite claim identifier `((block_number << 64) + tx_index) << 64 + log_index`. Orders
/// exactly like the coordinate tuple it was built from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ClaimId(U256);

impl ClaimId {
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wraps an already packed id.
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    pub fn from_coordinates(coordinates: LogCoordinates) -> Self {
        Self(
            (U256::from(coordinates.block_number) << BLOCK_NUMBER_SHIFT)
                | (U256::from(coordinates.tx_index) << TX_INDEX_SHIFT)
                | U256::from(coordinates.log_index),
        )
    }

    /// Inverse of [`ClaimId::from_coordinates`]. Raw ids using the top 64 bits were not packed
    /// from coordinates and yield `None`.
    pub fn coordinates(&self) -> Option<LogCoordinates> {
        let limbs = self.0.as_limbs();
        if limbs[3] != 0 {
            return None;
        }
        Some(LogCoordinates {
            block_number: limbs[2],
            tx_index: limbs[1],
            log_index: limbs[0],
        })
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::ops::Deref for ClaimId {
    type Target = U256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ClaimId> for U256 {
    fn from(id: ClaimId) -> Self {
        id.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
