use crate::{ClaimConfig, ClaimError, Mismatch, ResolvedLog};

/// The log must come from the configured contract and, when a schema is configured, carry it as
/// its first topic. Applies to padding slots as well.
pub fn check_provenance(
    slot: usize,
    log: &ResolvedLog,
    config: &ClaimConfig,
) -> Result<(), ClaimError> {
    if log.emitter != config.expected_contract {
        return Err(ClaimError::ProvenanceMismatch {
            slot,
            reason: Mismatch::Emitter {
                expected: config.expected_contract,
                found: log.emitter,
            },
        });
    }
    if let Some(expected) = config.event_schema {
        let found = log.schema();
        if found != Some(expected) {
            return Err(ClaimError::ProvenanceMismatch {
                slot,
                reason: Mismatch::Schema { expected, found },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    fn log(config: &ClaimConfig) -> ResolvedLog {
        ResolvedLog {
            emitter: config.expected_contract,
            topics: config.event_schema.into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_expected_emitter_and_schema() {
        let config = ClaimConfig::default();
        assert_eq!(check_provenance(0, &log(&config), &config), Ok(()));
    }

    #[test]
    fn emitter_is_checked_before_schema() {
        let config = ClaimConfig::default();
        let log = ResolvedLog {
            emitter: Address::repeat_byte(0x11),
            ..Default::default()
        };

        assert_eq!(
            check_provenance(6, &log, &config),
            Err(ClaimError::ProvenanceMismatch {
                slot: 6,
                reason: Mismatch::Emitter {
                    expected: config.expected_contract,
                    found: Address::repeat_byte(0x11),
                },
            })
        );
    }

    #[test]
    fn rejects_other_event_from_expected_contract() {
        let config = ClaimConfig::default();
        let mut other = log(&config);
        other.topics[0] = B256::repeat_byte(0xab);

        assert!(matches!(
            check_provenance(1, &other, &config),
            Err(ClaimError::ProvenanceMismatch {
                slot: 1,
                reason: Mismatch::Schema { found: Some(_), .. },
            })
        ));

        other.topics.clear();
        assert!(matches!(
            check_provenance(1, &other, &config),
            Err(ClaimError::ProvenanceMismatch {
                reason: Mismatch::Schema { found: None, .. },
                ..
            })
        ));
    }

    #[test]
    fn schema_check_can_be_disabled() {
        let config = ClaimConfig {
            event_schema: None,
            ..Default::default()
        };
        let log = ResolvedLog {
            emitter: config.expected_contract,
            topics: vec![B256::repeat_byte(0xab)],
            ..Default::default()
        };
        assert_eq!(check_provenance(0, &log, &config), Ok(()));
    }
}
