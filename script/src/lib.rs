//! Host side of the claim verifier: fetches the blocks a batch references, caches them and
//! turns them into receipt witnesses for the claim program.

pub mod cache;
pub mod rpc;
pub mod witness;

use eyre::WrapErr;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub use cache::{Cache, CacheError, CachedBlock};
pub use rpc::{checked_block, RpcSource};
pub use witness::{block_requests, build_witnesses, collect_witnesses};

/// Reads a json file into `T`.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> eyre::Result<T> {
    let path = path.as_ref();
    let json =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).wrap_err_with(|| format!("parsing {}", path.display()))
}
