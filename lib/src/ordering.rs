use crate::{ClaimError, ClaimId};

/// Requires every masked id to be strictly greater than its predecessor unless it is the zero
/// padding sentinel. Rejects duplicates and out-of-order submissions among active slots.
///
/// Relaxing the check on zero is only sound because padding is always a contiguous suffix. A
/// real claim whose id is zero (block 0, tx 0, log 0) cannot be told apart from padding.
pub fn check_ordering(masked_ids: &[ClaimId]) -> Result<(), ClaimError> {
    for (slot, pair) in masked_ids.windows(2).enumerate().map(|(i, p)| (i + 1, p)) {
        let (previous, current) = (pair[0], pair[1]);
        if previous < current || current.is_zero() {
            continue;
        }
        return Err(ClaimError::OrderingViolation {
            slot,
            previous,
            current,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogCoordinates;

    fn id(block_number: u64, tx_index: u64, log_index: u64) -> ClaimId {
        ClaimId::from_coordinates(LogCoordinates::new(block_number, tx_index, log_index))
    }

    #[test]
    fn accepts_ascending_prefix_followed_by_padding() {
        let ids = [
            id(100, 4, 1),
            id(100, 4, 2),
            id(101, 0, 0),
            ClaimId::ZERO,
            ClaimId::ZERO,
        ];
        assert_eq!(check_ordering(&ids), Ok(()));
    }

    #[test]
    fn rejects_duplicates() {
        let ids = [id(100, 4, 1), id(100, 4, 1), ClaimId::ZERO];
        assert_eq!(
            check_ordering(&ids),
            Err(ClaimError::OrderingViolation {
                slot: 1,
                previous: ids[0],
                current: ids[1],
            })
        );
    }

    #[test]
    fn reports_first_descending_slot() {
        let ids = [id(1, 0, 0), id(3, 0, 0), id(2, 0, 0), id(1, 0, 0)];
        let err = check_ordering(&ids).unwrap_err();
        assert_eq!(err.slot(), Some(2));
    }

    #[test]
    fn zero_id_claim_reads_as_padding() {
        // documented limitation: an active claim at (0, 0, 0) passes the zero check
        let ids = [id(5, 0, 0), id(0, 0, 0)];
        assert_eq!(check_ordering(&ids), Ok(()));
    }

    #[test]
    fn single_slot_is_always_ordered() {
        assert_eq!(check_ordering(&[id(9, 9, 9)]), Ok(()));
        assert_eq!(check_ordering(&[]), Ok(()));
    }
}
