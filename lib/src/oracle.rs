use crate::{LogCoordinates, OracleError};
use alloy_primitives::{Address, Bytes, Log, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WORD: usize = 32;

/// Read-only source of event data addressed by log coordinates. Treated as authoritative, the
/// verifier never caches or mutates what it returns.
pub trait EventOracle {
    fn resolve(&self, coordinates: LogCoordinates) -> Result<ResolvedLog, OracleError>;
}

impl<O: EventOracle + ?Sized> EventOracle for &O {
    fn resolve(&self, coordinates: LogCoordinates) -> Result<ResolvedLog, OracleError> {
        (**self).resolve(coordinates)
    }
}

/// The facts about one log the verifier consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedLog {
    pub emitter: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl ResolvedLog {
    /// Event signature hash, absent for anonymous events.
    pub fn schema(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// Big-endian 32-byte word `offset` of the non-indexed event data.
    pub fn word(&self, offset: usize) -> Result<U256, OracleError> {
        offset
            .checked_mul(WORD)
            .and_then(|start| self.data.get(start..start.checked_add(WORD)?))
            .map(U256::from_be_slice)
            .ok_or(OracleError::MissingField {
                offset,
                len: self.data.len(),
            })
    }
}

impl From<&Log> for ResolvedLog {
    fn from(log: &Log) -> Self {
        Self {
            emitter: log.address,
            topics: log.data.topics().to_vec(),
            data: log.data.data.clone(),
        }
    }
}

/// In-memory oracle over already trusted logs.
#[derive(Debug, Clone, Default)]
pub struct MapOracle(BTreeMap<LogCoordinates, ResolvedLog>);

impl MapOracle {
    pub fn insert(&mut self, coordinates: LogCoordinates, log: ResolvedLog) -> Option<ResolvedLog> {
        self.0.insert(coordinates, log)
    }

    pub fn get_mut(&mut self, coordinates: &LogCoordinates) -> Option<&mut ResolvedLog> {
        self.0.get_mut(coordinates)
    }
}

impl FromIterator<(LogCoordinates, ResolvedLog)> for MapOracle {
    fn from_iter<I: IntoIterator<Item = (LogCoordinates, ResolvedLog)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl EventOracle for MapOracle {
    fn resolve(&self, coordinates: LogCoordinates) -> Result<ResolvedLog, OracleError> {
        self.0
            .get(&coordinates)
            .cloned()
            .ok_or(OracleError::NotFound(coordinates))
    }
}
