use crate::{ClaimConfig, ClaimError, LogCoordinates, ResolvedLog, SlotMask};
use alloy_primitives::U256;

/// Running identity and amount over the slots of a batch.
///
/// The identity is pinned by slot 0 and compared on every slot. Amounts are read on every slot
/// but only accumulated for active ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    identity: Option<U256>,
    total: U256,
}

impl Tally {
    pub fn absorb(
        mut self,
        slot: usize,
        coordinates: LogCoordinates,
        log: &ResolvedLog,
        mask: &SlotMask,
        config: &ClaimConfig,
    ) -> Result<Self, ClaimError> {
        let field = |offset| {
            log.word(offset)
                .map_err(|source| ClaimError::OracleResolutionFailure {
                    slot,
                    coordinates,
                    source,
                })
        };

        let identity = field(config.identity_offset)?;
        match self.identity {
            None => self.identity = Some(identity),
            Some(expected) if expected != identity => {
                return Err(ClaimError::IdentityMismatch {
                    slot,
                    expected,
                    found: identity,
                })
            }
            Some(_) => {}
        }

        let amount = field(config.amount_offset)?;
        if mask.is_active(slot) {
            self.total = self
                .total
                .checked_add(amount)
                .ok_or(ClaimError::AmountOverflow { slot })?;
        }
        Ok(self)
    }

    /// Identity pinned by the first absorbed slot, zero before any.
    pub fn identity(&self) -> U256 {
        self.identity.unwrap_or_default()
    }

    pub fn total(&self) -> U256 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(identity: u64, amount: U256) -> ResolvedLog {
        let mut data = vec![0u8; 10 * 32];
        data[2 * 32..][..32].copy_from_slice(&U256::from(identity).to_be_bytes::<32>());
        data[9 * 32..][..32].copy_from_slice(&amount.to_be_bytes::<32>());
        ResolvedLog {
            data: data.into(),
            ..Default::default()
        }
    }

    fn fold(logs: &[ResolvedLog], num_claims: u64) -> Result<Tally, ClaimError> {
        let config = ClaimConfig::default().with_max_claims(logs.len());
        let mask = SlotMask::new(U256::from(num_claims), logs.len()).unwrap();
        logs.iter().enumerate().try_fold(Tally::default(), |tally, (slot, log)| {
            tally.absorb(slot, LogCoordinates::default(), log, &mask, &config)
        })
    }

    #[test]
    fn sums_active_slots_only() {
        let logs = [
            log(4, U256::from(10)),
            log(4, U256::from(20)),
            log(4, U256::from(1_000)),
        ];

        let tally = fold(&logs, 2).unwrap();
        assert_eq!(tally.identity(), U256::from(4));
        assert_eq!(tally.total(), U256::from(30));

        assert_eq!(fold(&logs, 3).unwrap().total(), U256::from(1_030));
    }

    #[test]
    fn padding_identity_must_still_match() {
        let logs = [
            log(4, U256::from(1)),
            log(4, U256::from(1)),
            log(5, U256::from(1)),
        ];
        assert_eq!(
            fold(&logs, 1),
            Err(ClaimError::IdentityMismatch {
                slot: 2,
                expected: U256::from(4),
                found: U256::from(5),
            })
        );
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let logs = [log(1, U256::MAX), log(1, U256::from(1))];
        assert_eq!(fold(&logs, 2), Err(ClaimError::AmountOverflow { slot: 1 }));
        assert_eq!(fold(&logs, 1).unwrap().total(), U256::MAX);
    }

    #[test]
    fn short_payload_fails_resolution() {
        // identity word present, amount word missing
        let mut data = vec![0u8; 3 * 32];
        data[3 * 32 - 1] = 1;
        let short = ResolvedLog {
            data: data.into(),
            ..Default::default()
        };
        assert!(matches!(
            fold(&[log(1, U256::from(1)), short], 1),
            Err(ClaimError::OracleResolutionFailure { slot: 1, .. })
        ));
    }
}
