use crate::cache::{Cache, CacheError};
use crate::rpc::RpcSource;
use alloy_primitives::BlockNumber;
use alloy_provider::Provider;
use claim_lib::{BlockWitness, EncodedBatch};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Transactions each block must prove a receipt for, padding slots included.
pub fn block_requests(encoded: &EncodedBatch) -> BTreeMap<BlockNumber, BTreeSet<u64>> {
    let mut requests: BTreeMap<_, BTreeSet<_>> = BTreeMap::new();
    for coordinates in encoded.coordinates() {
        requests
            .entry(coordinates.block_number)
            .or_default()
            .insert(coordinates.tx_index);
    }
    requests
}

/// Builds one witness per requested block out of cached blocks.
pub fn build_witnesses(
    requests: &BTreeMap<BlockNumber, BTreeSet<u64>>,
    cache: &Cache,
) -> Result<Vec<BlockWitness>, CacheError> {
    requests
        .iter()
        .map(|(number, tx_indices)| {
            let block = cache
                .get_block(*number)
                .ok_or(CacheError::MissingBlock(*number))?;
            Ok(BlockWitness::build(
                &block.header,
                &block.receipts,
                tx_indices.iter().copied(),
            ))
        })
        .collect()
}

/// Fetches every block the batch references that is not cached yet, then builds witnesses.
pub async fn collect_witnesses<P: Provider>(
    encoded: &EncodedBatch,
    source: &RpcSource<P>,
    cache: &mut Cache,
) -> eyre::Result<Vec<BlockWitness>> {
    let requests = block_requests(encoded);
    let missing: Vec<_> = requests
        .keys()
        .copied()
        .filter(|number| !cache.contains(*number))
        .collect();
    info!(
        blocks = requests.len(),
        cached = requests.len() - missing.len(),
        "collecting witnesses"
    );

    let fetched =
        futures::future::try_join_all(missing.iter().map(|number| source.fetch_block(*number)))
            .await?;
    for block in fetched {
        cache.insert_block(block);
    }

    Ok(build_witnesses(&requests, cache)?)
}
