//! Verification and aggregation of fixed-size batches of on-chain event claims.
//!
//! A batch names up to `max_claims` logs by `(block, tx, log)` coordinates. Verification packs
//! every claim into an order preserving [`ClaimId`], checks the active ids are strictly
//! ascending, resolves every slot through an [`EventOracle`], checks each event's emitter,
//! schema and claimant identity, and sums the claimed amount over the active slots.

mod aggregate;
mod batch;
mod claim;
mod config;
mod error;
mod oracle;
pub mod ordering;
pub mod provenance;
pub mod receipt_trie;
mod summary;
mod verify;
mod witness;

#[cfg(feature = "random")]
pub mod testing;

pub use aggregate::Tally;
pub use batch::{Batch, SlotMask};
pub use claim::{Claim, ClaimId, LogCoordinates};
pub use config::*;
pub use error::{ClaimError, Mismatch, OracleError};
pub use oracle::{EventOracle, MapOracle, ResolvedLog};
pub use summary::{BatchSummary, BlockRef, ClaimPublicValues};
pub use verify::{verify_batch, ClaimInput, EncodedBatch};
pub use witness::{BlockWitness, ReceiptWitness, WitnessOracle};
