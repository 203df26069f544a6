//! Verifies a claim batch against proven receipts and commits the ABI encoded batch summary.
//!
//! A rejected batch panics, so no proof exists for it.

#![no_main]
sp1_zkvm::entrypoint!(main);

use claim_lib::ClaimInput;

pub fn main() {
    let input: ClaimInput = sp1_zkvm::io::read();

    let values = match input.verify() {
        Ok(values) => values,
        Err(err) => panic!("claim batch rejected: {err}"),
    };

    sp1_zkvm::io::commit_slice(&values.encode());
}
