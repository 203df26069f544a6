//! Receipt-proof backed event oracle. Each block carries its RLP encoded header and, for every
//! transaction a batch references, the EIP-2718 encoded receipt with a Merkle-Patricia proof
//! against the header's `receipts_root`.

use crate::receipt_trie::{receipt_logs, receipt_proof, verify_receipt_proof};
use crate::{EventOracle, LogCoordinates, OracleError, ResolvedLog};
use alloy_consensus::Header;
use alloy_primitives::{BlockNumber, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptWitness {
    pub tx_index: u64,
    pub receipt: Bytes,
    pub proof: Vec<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWitness {
    pub header: Bytes,
    pub receipts: Vec<ReceiptWitness>,
}

impl BlockWitness {
    /// Builds proofs for the receipts at `tx_indices` out of the block's full list of EIP-2718
    /// encoded receipts. Indices without a receipt are skipped, resolving them later fails.
    pub fn build(
        header: &Header,
        receipts: &[Bytes],
        tx_indices: impl IntoIterator<Item = u64>,
    ) -> Self {
        let mut encoded_header = Vec::with_capacity(header.length());
        header.encode(&mut encoded_header);

        let mut witnesses = BTreeMap::new();
        for tx_index in tx_indices {
            if witnesses.contains_key(&tx_index) {
                continue;
            }
            let Some(proof) = receipt_proof(receipts, tx_index) else {
                continue;
            };
            witnesses.insert(
                tx_index,
                ReceiptWitness {
                    tx_index,
                    receipt: receipts[tx_index as usize].clone(),
                    proof,
                },
            );
        }

        Self {
            header: encoded_header.into(),
            receipts: witnesses.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct ProvenBlock {
    header: Header,
    hash: B256,
    receipts: BTreeMap<u64, ReceiptWitness>,
}

/// [`EventOracle`] that only answers with logs whose receipt is proven to be part of a block
/// header it was given.
#[derive(Debug, Clone, Default)]
pub struct WitnessOracle {
    blocks: BTreeMap<BlockNumber, ProvenBlock>,
}

impl WitnessOracle {
    /// Witnesses with an undecodable header are dropped, every lookup into them then fails.
    pub fn new(witnesses: impl IntoIterator<Item = BlockWitness>) -> Self {
        let mut blocks = BTreeMap::new();
        for witness in witnesses {
            let header = match Header::decode(&mut witness.header.as_ref()) {
                Ok(header) => header,
                Err(err) => {
                    warn!(%err, "dropping block witness with malformed header");
                    continue;
                }
            };
            let receipts = witness
                .receipts
                .into_iter()
                .map(|receipt| (receipt.tx_index, receipt))
                .collect();
            blocks.insert(
                header.number,
                ProvenBlock {
                    hash: header.hash_slow(),
                    header,
                    receipts,
                },
            );
        }
        Self { blocks }
    }

    /// `(number, hash)` of every witnessed block, ascending by number.
    pub fn block_refs(&self) -> Vec<(BlockNumber, B256)> {
        self.blocks
            .iter()
            .map(|(number, block)| (*number, block.hash))
            .collect()
    }

    pub fn header(&self, number: BlockNumber) -> Option<&Header> {
        self.blocks.get(&number).map(|block| &block.header)
    }
}

impl EventOracle for WitnessOracle {
    fn resolve(&self, coordinates: LogCoordinates) -> Result<ResolvedLog, OracleError> {
        let block = self
            .blocks
            .get(&coordinates.block_number)
            .ok_or(OracleError::UnknownBlock(coordinates.block_number))?;
        let witness = block.receipts.get(&coordinates.tx_index).ok_or(
            OracleError::UnknownTransaction {
                block_number: coordinates.block_number,
                tx_index: coordinates.tx_index,
            },
        )?;

        let receipts_root = block.header.receipts_root;
        verify_receipt_proof(
            receipts_root,
            coordinates.tx_index,
            &witness.receipt,
            &witness.proof,
        )
        .map_err(|_| OracleError::InvalidReceiptProof { receipts_root })?;

        let logs = receipt_logs(&witness.receipt)
            .map_err(|err| OracleError::MalformedReceipt(err.to_string()))?;
        logs.get(coordinates.log_index as usize)
            .map(ResolvedLog::from)
            .ok_or(OracleError::UnknownLog {
                log_index: coordinates.log_index,
                logs: logs.len(),
            })
    }
}
