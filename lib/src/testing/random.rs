use crate::receipt_trie::{encode_receipts, receipts_root};
use crate::{BlockWitness, ClaimConfig, LogCoordinates, MapOracle, ResolvedLog};
use alloy_consensus::{Header, Receipt, ReceiptWithBloom};
use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256};
use op_alloy_consensus::{OpDepositReceipt, OpDepositReceiptWithBloom, OpReceiptEnvelope};
use rand::Rng;

const MIN_DATA_WORDS: usize = 10;

/// A claimable log placed into a synthetic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClaim {
    pub coordinates: LogCoordinates,
    pub log: ResolvedLog,
    pub amount: U256,
}

#[derive(Debug, Clone)]
struct GeneratedBlock {
    header: Header,
    receipts: Vec<Bytes>,
    claimed_txs: Vec<u64>,
}

/// Synthesizes blocks whose receipts carry claimable events for a [`ClaimConfig`], next to
/// unrelated noise logs. Blocks get strictly increasing numbers so claims come out ordered.
/// Like an OP stack block, transaction 0 of every block is a deposit.
#[derive(Debug, Clone)]
pub struct ClaimFactory<R> {
    config: ClaimConfig,
    rng: R,
    /// Emitter used for newly generated claim logs.
    pub emitter: Address,
    /// Identity written into newly generated claim logs.
    pub identity: U256,
    next_block: u64,
    blocks: Vec<GeneratedBlock>,
}

impl<R: Rng> ClaimFactory<R> {
    pub fn new(config: ClaimConfig, mut rng: R) -> Self {
        let identity = U256::from(rng.random::<u128>());
        let next_block = rng.random_range(10_000_000..20_000_000);
        Self {
            emitter: config.expected_contract,
            config,
            rng,
            identity,
            next_block,
            blocks: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    /// Generates `count` claims, each in a fresh block.
    pub fn claims(&mut self, count: usize) -> Vec<GeneratedClaim> {
        (0..count).map(|_| self.claim()).collect()
    }

    pub fn claim(&mut self) -> GeneratedClaim {
        let block_number = self.next_block;
        self.next_block += self.rng.random_range(1..1_000);

        let tx_count = self.rng.random_range(2..40u64);
        let tx_index = self.rng.random_range(1..tx_count);
        let amount = U256::from(self.rng.random::<u64>() >> 4);
        let claim_log = self.claim_log(amount);

        let mut receipts = Vec::with_capacity(tx_count as usize);
        receipts.push(deposit_receipt(self.rng.random()));
        let mut log_index = 0;
        for i in 1..tx_count {
            let mut logs: Vec<Log> = (0..self.rng.random_range(0..4))
                .map(|_| self.noise_log())
                .collect();
            if i == tx_index {
                log_index = self.rng.random_range(0..=logs.len());
                logs.insert(log_index, claim_log.clone());
            }
            receipts.push(receipt(logs, 21_000 * (i + 1)));
        }

        let receipts = encode_receipts(&receipts);
        let header = Header {
            parent_hash: B256::from(self.rng.random::<[u8; 32]>()),
            number: block_number,
            receipts_root: receipts_root(&receipts),
            ..Default::default()
        };
        self.blocks.push(GeneratedBlock {
            header,
            receipts,
            claimed_txs: vec![tx_index],
        });

        GeneratedClaim {
            coordinates: LogCoordinates::new(block_number, tx_index, log_index as u64),
            log: ResolvedLog::from(&claim_log),
            amount,
        }
    }

    /// Proven witnesses for every block generated so far.
    pub fn witnesses(&self) -> Vec<BlockWitness> {
        self.blocks
            .iter()
            .map(|block| {
                BlockWitness::build(
                    &block.header,
                    &block.receipts,
                    block.claimed_txs.iter().copied(),
                )
            })
            .collect()
    }

    /// Headers and full encoded receipt lists of every block generated so far.
    pub fn blocks(&self) -> Vec<(Header, Vec<Bytes>)> {
        self.blocks
            .iter()
            .map(|block| (block.header.clone(), block.receipts.clone()))
            .collect()
    }

    /// Encoded receipt that belongs to no generated block.
    pub fn foreign_receipt(&mut self) -> Bytes {
        let log = self.claim_log(U256::from(1));
        encode_receipts(&[receipt(vec![log], 1)]).remove(0)
    }

    fn claim_log(&mut self, amount: U256) -> Log {
        let words = MIN_DATA_WORDS
            .max(self.config.identity_offset + 1)
            .max(self.config.amount_offset + 1);
        let mut data = vec![0u8; words * 32];
        self.rng.fill(&mut data[..]);
        write_word(&mut data, self.config.identity_offset, self.identity);
        write_word(&mut data, self.config.amount_offset, amount);

        let topics = self.config.event_schema.into_iter().collect();
        Log {
            address: self.emitter,
            data: LogData::new_unchecked(topics, data.into()),
        }
    }

    fn noise_log(&mut self) -> Log {
        let data: [u8; 64] = self.rng.random();
        Log {
            address: Address::from(self.rng.random::<[u8; 20]>()),
            data: LogData::new_unchecked(
                vec![B256::from(self.rng.random::<[u8; 32]>())],
                data.to_vec().into(),
            ),
        }
    }
}

/// Oracle answering with the logs of `claims` directly, skipping receipt proofs.
pub fn oracle_for(claims: &[GeneratedClaim]) -> MapOracle {
    claims
        .iter()
        .map(|claim| (claim.coordinates, claim.log.clone()))
        .collect()
}

fn write_word(data: &mut [u8], offset: usize, value: U256) {
    data[offset * 32..][..32].copy_from_slice(&value.to_be_bytes::<32>());
}

fn receipt(logs: Vec<Log>, cumulative_gas_used: u64) -> OpReceiptEnvelope {
    OpReceiptEnvelope::Eip1559(ReceiptWithBloom {
        receipt: Receipt {
            status: true.into(),
            cumulative_gas_used,
            logs,
        },
        logs_bloom: Default::default(),
    })
}

fn deposit_receipt(deposit_nonce: u64) -> OpReceiptEnvelope {
    OpReceiptEnvelope::Deposit(OpDepositReceiptWithBloom {
        receipt: OpDepositReceipt {
            inner: Receipt {
                status: true.into(),
                cumulative_gas_used: 46_000,
                logs: Vec::new(),
            },
            deposit_nonce: Some(deposit_nonce),
            deposit_receipt_version: Some(1),
        },
        logs_bloom: Default::default(),
    })
}
