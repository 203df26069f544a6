use crate::aggregate::Tally;
use crate::ordering::check_ordering;
use crate::provenance::check_provenance;
use crate::{
    Batch, BatchSummary, BlockWitness, ClaimConfig, ClaimError, ClaimId, ClaimPublicValues,
    EventOracle, LogCoordinates, ResolvedLog, SlotMask, WitnessOracle,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A batch that passed every check that needs no event data: shape, claim count, coordinate
/// range and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    mask: SlotMask,
    coordinates: Vec<LogCoordinates>,
    masked_ids: Vec<ClaimId>,
}

impl EncodedBatch {
    pub fn encode(batch: &Batch, config: &ClaimConfig) -> Result<Self, ClaimError> {
        batch.check_shape(config.max_claims)?;
        let mask = SlotMask::new(batch.num_claims, config.max_claims)?;

        let mut coordinates = Vec::with_capacity(config.max_claims);
        let mut masked_ids = Vec::with_capacity(config.max_claims);
        for (slot, claim) in batch.claims().enumerate() {
            let slot_coordinates = claim.coordinates(slot)?;
            coordinates.push(slot_coordinates);
            masked_ids.push(mask.mask(slot, ClaimId::from_coordinates(slot_coordinates)));
        }

        check_ordering(&masked_ids)?;
        debug!(
            num_claims = mask.num_claims(),
            first = %masked_ids[0],
            "claim ids encoded and ordered"
        );

        Ok(Self {
            mask,
            coordinates,
            masked_ids,
        })
    }

    pub fn mask(&self) -> &SlotMask {
        &self.mask
    }

    /// Oracle coordinates of every slot, padding included.
    pub fn coordinates(&self) -> &[LogCoordinates] {
        &self.coordinates
    }

    pub fn masked_ids(&self) -> &[ClaimId] {
        &self.masked_ids
    }

    /// Resolves every slot, lowest failing slot wins.
    pub fn resolve<O: EventOracle + ?Sized>(
        &self,
        oracle: &O,
    ) -> Result<Vec<ResolvedLog>, ClaimError> {
        self.coordinates
            .iter()
            .enumerate()
            .map(|(slot, coordinates)| {
                trace!(slot, %coordinates, "resolving");
                oracle
                    .resolve(*coordinates)
                    .map_err(|source| ClaimError::OracleResolutionFailure {
                        slot,
                        coordinates: *coordinates,
                        source,
                    })
            })
            .collect()
    }

    /// Runs provenance, identity and amount over already resolved slot logs, in slot order.
    pub fn aggregate(
        &self,
        logs: &[ResolvedLog],
        config: &ClaimConfig,
    ) -> Result<BatchSummary, ClaimError> {
        if logs.len() != self.coordinates.len() {
            return Err(ClaimError::InputShape {
                field: "resolvedLogs",
                actual: logs.len(),
                expected: self.coordinates.len(),
            });
        }

        let tally = self.coordinates.iter().zip(logs).enumerate().try_fold(
            Tally::default(),
            |tally, (slot, (coordinates, log))| {
                check_provenance(slot, log, config)?;
                tally.absorb(slot, *coordinates, log, &self.mask, config)
            },
        )?;

        let summary =
            BatchSummary::select(&self.masked_ids, &self.mask, tally.identity(), tally.total());
        debug!(
            first = %summary.first_claim_id,
            last = %summary.last_claim_id,
            identity = %summary.identity,
            total = %summary.total_amount,
            "batch verified"
        );
        Ok(summary)
    }
}

/// Verifies a batch end to end against `oracle`.
///
/// Violations are reported in a fixed order: shape, claim count, encoding, ordering, oracle
/// resolution, then per slot provenance and identity. The first one found is returned.
pub fn verify_batch<O: EventOracle + ?Sized>(
    batch: &Batch,
    config: &ClaimConfig,
    oracle: &O,
) -> Result<BatchSummary, ClaimError> {
    let encoded = EncodedBatch::encode(batch, config)?;
    let logs = encoded.resolve(oracle)?;
    encoded.aggregate(&logs, config)
}

/// Everything the claim program reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInput {
    pub batch: Batch,
    pub config: ClaimConfig,
    pub witnesses: Vec<BlockWitness>,
}

impl ClaimInput {
    /// Verifies the batch against its own witnesses and returns the values to commit.
    pub fn verify(self) -> Result<ClaimPublicValues, ClaimError> {
        let oracle = WitnessOracle::new(self.witnesses);
        let summary = verify_batch(&self.batch, &self.config, &oracle)?;
        Ok(summary.public_values(&self.config, oracle.block_refs()))
    }
}
