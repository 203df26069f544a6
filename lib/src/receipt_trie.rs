use alloy_consensus::{ReceiptEnvelope, TxReceipt as _};
use alloy_eips::eip2718::{Decodable2718, Eip2718Error, Encodable2718};
use alloy_primitives::{Bytes, Log, B256};
use alloy_rlp::{encode_fixed_size, Encodable};
use alloy_trie::{
    proof::{verify_proof, ProofNodes, ProofRetainer, ProofVerificationError},
    root::adjust_index_for_rlp,
    HashBuilder, Nibbles,
};
use op_alloy_consensus::OpReceiptEnvelope;

/// EIP-2718 type of OP stack deposit receipts.
pub const DEPOSIT_RECEIPT_TYPE: u8 = 0x7e;

/// Trie key of the receipt at `index`: the RLP encoding of the index.
pub fn receipt_key(index: u64) -> Nibbles {
    let mut encoded_index_buffer = Vec::<u8>::new();
    index.encode(&mut encoded_index_buffer);
    Nibbles::unpack(encoded_index_buffer)
}

/// EIP-2718 encodes every receipt, in order.
pub fn encode_receipts<R: Encodable2718>(receipts: &[R]) -> Vec<Bytes> {
    receipts
        .iter()
        .map(|receipt| {
            let mut buf = Vec::with_capacity(receipt.encode_2718_len());
            receipt.encode_2718(&mut buf);
            buf.into()
        })
        .collect()
}

fn add_leaves<T: AsRef<[u8]>>(mut hb: HashBuilder, encoded: &[T]) -> HashBuilder {
    let items_len = encoded.len();
    for i in 0..items_len {
        let index = adjust_index_for_rlp(i, items_len);
        let index_buffer = encode_fixed_size(&index);
        hb.add_leaf(Nibbles::unpack(&index_buffer), encoded[index].as_ref());
    }
    hb
}

/// Receipts root over already encoded receipts. Works for any receipt type, deposit receipts
/// included, as long as the bytes are the consensus encoding.
pub fn receipts_root<T: AsRef<[u8]>>(encoded: &[T]) -> B256 {
    add_leaves(HashBuilder::default(), encoded).root()
}

/// Rebuilds the receipt trie of a block, retaining the nodes on the path to `index`.
///
/// # Panics
///
/// If `index` is out of bounds for `encoded`.
pub fn get_trie_proof_nodes<T: AsRef<[u8]>>(encoded: &[T], index: u64) -> ProofNodes {
    assert!((index as usize) < encoded.len());

    let retainer = ProofRetainer::new(vec![receipt_key(index)]);
    let mut hb = add_leaves(
        HashBuilder::default().with_proof_retainer(retainer),
        encoded,
    );

    hb.root();

    hb.take_proof_nodes()
}

/// Inclusion proof for the receipt at `index`, ordered from the root node down to the leaf.
/// Returns `None` when `index` is out of bounds.
pub fn receipt_proof<T: AsRef<[u8]>>(encoded: &[T], index: u64) -> Option<Vec<Bytes>> {
    if index >= encoded.len() as u64 {
        return None;
    }
    let mut proof_steps = get_trie_proof_nodes(encoded, index)
        .into_inner()
        .into_iter()
        .collect::<Vec<_>>();
    proof_steps.sort_by_key(|(key, _)| key.len());
    Some(proof_steps.into_iter().map(|(_, node)| node).collect())
}

/// Checks that `encoded_receipt` (EIP-2718 encoding) sits at `index` in the trie rooted at
/// `receipts_root`.
pub fn verify_receipt_proof(
    receipts_root: B256,
    index: u64,
    encoded_receipt: &[u8],
    proof: &[Bytes],
) -> Result<(), ProofVerificationError> {
    verify_proof(
        receipts_root,
        receipt_key(index),
        Some(encoded_receipt.to_vec()),
        proof.iter(),
    )
}

/// Logs of an EIP-2718 encoded receipt. Ethereum receipt types and OP stack deposit receipts
/// are understood.
pub fn receipt_logs(mut encoded: &[u8]) -> Result<Vec<Log>, Eip2718Error> {
    if encoded.first() == Some(&DEPOSIT_RECEIPT_TYPE) {
        let receipt: OpReceiptEnvelope = OpReceiptEnvelope::decode_2718(&mut encoded)?;
        return Ok(receipt.logs().to_vec());
    }
    let receipt: ReceiptEnvelope = ReceiptEnvelope::decode_2718(&mut encoded)?;
    Ok(receipt.logs().to_vec())
}
