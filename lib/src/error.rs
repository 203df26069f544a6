use crate::claim::{ClaimId, LogCoordinates};
use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

/// Reasons a claim batch is rejected. Every variant is terminal for the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("{field} holds {actual} entries, expected {expected}")]
    InputShape {
        field: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("numClaims {num_claims} outside [1, {max_claims}]")]
    RangeViolation { num_claims: U256, max_claims: usize },
    #[error("slot {slot}: {field} {value} does not fit in 64 bits")]
    EncodingOverflow {
        slot: usize,
        field: &'static str,
        value: U256,
    },
    #[error("slot {slot}: claim id {current} does not follow {previous}")]
    OrderingViolation {
        slot: usize,
        previous: ClaimId,
        current: ClaimId,
    },
    #[error("slot {slot}: failed to resolve {coordinates}: {source}")]
    OracleResolutionFailure {
        slot: usize,
        coordinates: LogCoordinates,
        #[source]
        source: OracleError,
    },
    #[error("slot {slot}: {reason}")]
    ProvenanceMismatch { slot: usize, reason: Mismatch },
    #[error("slot {slot}: identity {found} differs from {expected}")]
    IdentityMismatch {
        slot: usize,
        expected: U256,
        found: U256,
    },
    #[error("slot {slot}: total amount overflows 256 bits")]
    AmountOverflow { slot: usize },
}

impl ClaimError {
    /// Slot the violation was found at, if it is tied to one.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::InputShape { .. } | Self::RangeViolation { .. } => None,
            Self::EncodingOverflow { slot, .. }
            | Self::OrderingViolation { slot, .. }
            | Self::OracleResolutionFailure { slot, .. }
            | Self::ProvenanceMismatch { slot, .. }
            | Self::IdentityMismatch { slot, .. }
            | Self::AmountOverflow { slot } => Some(*slot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("event emitted by {found}, expected {expected}")]
    Emitter { expected: Address, found: Address },
    #[error("event schema {found:?}, expected {expected}")]
    Schema { expected: B256, found: Option<B256> },
}

/// Failures of an [`EventOracle`](crate::EventOracle) to produce the event at some coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("no event at {0}")]
    NotFound(LogCoordinates),
    #[error("block {0} is unknown")]
    UnknownBlock(u64),
    #[error("no receipt for transaction {tx_index} in block {block_number}")]
    UnknownTransaction { block_number: u64, tx_index: u64 },
    #[error("receipt has {logs} logs, log {log_index} requested")]
    UnknownLog { log_index: u64, logs: usize },
    #[error("receipt proof does not open receipts root {receipts_root}")]
    InvalidReceiptProof { receipts_root: B256 },
    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),
    #[error("log data holds {len} bytes, word {offset} requested")]
    MissingField { offset: usize, len: usize },
}
