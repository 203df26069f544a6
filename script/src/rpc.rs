use crate::cache::CachedBlock;
use alloy_consensus::Header;
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{BlockNumber, Bytes, B256};
use alloy_provider::Provider;
use claim_lib::receipt_trie::{encode_receipts, receipts_root};
use eyre::{eyre, WrapErr};
use tracing::{debug, info, warn};

/// Fetches blocks together with every receipt in them over JSON-RPC.
///
/// Receipts are pulled in their consensus encoding through `debug_getRawReceipts`, which works
/// for every chain the node serves, OP stack deposit receipts included. Nodes without the debug
/// namespace fall back to per transaction `eth_getTransactionReceipt`, which only understands
/// Ethereum receipt types.
#[derive(Debug, Clone)]
pub struct RpcSource<P> {
    provider: P,
}

impl<P: Provider> RpcSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches the header of block `number` and the receipts of all its transactions, checked
    /// against the header's receipts root.
    pub async fn fetch_block(&self, number: BlockNumber) -> eyre::Result<CachedBlock> {
        let block = self
            .provider
            .get_block_by_number(number.into(), false.into())
            .await
            .wrap_err_with(|| format!("fetching block #{number}"))?
            .ok_or_else(|| eyre!("block #{number} not found"))?;

        let hashes: Vec<_> = block.transactions.hashes().collect();
        info!(block = number, txs = hashes.len(), "fetching receipts");

        let receipts = match self.raw_receipts(number).await {
            Ok(receipts) => receipts,
            Err(err) => {
                warn!(block = number, %err, "raw receipts unavailable, fetching one by one");
                self.transaction_receipts(number, &hashes).await?
            }
        };

        checked_block(block.header.inner, receipts)
    }

    async fn raw_receipts(&self, number: BlockNumber) -> eyre::Result<Vec<Bytes>> {
        let receipts: Vec<Bytes> = self
            .provider
            .raw_request(
                "debug_getRawReceipts".into(),
                (BlockNumberOrTag::Number(number),),
            )
            .await?;
        Ok(receipts)
    }

    async fn transaction_receipts(
        &self,
        number: BlockNumber,
        hashes: &[B256],
    ) -> eyre::Result<Vec<Bytes>> {
        let receipts = futures::future::try_join_all(
            hashes
                .iter()
                .map(|hash| self.provider.get_transaction_receipt(*hash)),
        )
        .await
        .wrap_err_with(|| format!("fetching receipts of block #{number}"))?;

        let receipts = receipts
            .into_iter()
            .zip(hashes)
            .map(|(receipt, hash)| {
                receipt
                    .map(|receipt| receipt.into_primitives_receipt().inner)
                    .ok_or_else(|| eyre!("receipt {hash} of block #{number} not found"))
            })
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(encode_receipts(&receipts))
    }
}

/// Pairs a header with its encoded receipts once they hash to the header's receipts root.
pub fn checked_block(header: Header, receipts: Vec<Bytes>) -> eyre::Result<CachedBlock> {
    let root = receipts_root(&receipts);
    if root != header.receipts_root {
        return Err(eyre!(
            "receipts of block #{} hash to {root}, header says {}",
            header.number,
            header.receipts_root
        ));
    }
    debug!(block = header.number, %root, "receipts root matches");
    Ok(CachedBlock::new(header, receipts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_lib::{testing::ClaimFactory, ClaimConfig};
    use rand::{rngs::StdRng, SeedableRng};

    fn block() -> (Header, Vec<Bytes>) {
        let mut factory = ClaimFactory::new(ClaimConfig::default(), StdRng::seed_from_u64(5));
        factory.claims(1);
        factory.blocks().remove(0)
    }

    #[test]
    fn accepts_blocks_starting_with_a_deposit() {
        let (header, receipts) = block();
        assert_eq!(receipts[0][0], 0x7e);

        let cached = checked_block(header.clone(), receipts.clone()).unwrap();
        assert_eq!(cached, CachedBlock::new(header, receipts));
    }

    #[test]
    fn rejects_receipts_not_matching_the_header() {
        let (header, mut receipts) = block();
        receipts.swap(0, 1);
        assert!(checked_block(header.clone(), receipts.clone()).is_err());

        receipts.swap(0, 1);
        receipts.pop();
        assert!(checked_block(header, receipts).is_err());
    }
}
