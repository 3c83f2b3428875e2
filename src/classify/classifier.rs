use crate::classify::cigar::ReadStats;

/// Cutoffs a record must reach to count as a genuine human alignment.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Thresholds {
    pub min_pct_identity: f64,
    pub min_alignment_length: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_pct_identity: 0.5,
            min_alignment_length: 100,
        }
    }
}

/// True when the alignment is both long enough and identical enough.
/// Zero-length alignments never qualify.
pub fn is_mapped(stats: &ReadStats, thresholds: &Thresholds) -> bool {
    if stats.alignment_length == 0 {
        return false;
    }
    let pct_identity = stats.identities as f64 / stats.alignment_length as f64;
    pct_identity >= thresholds.min_pct_identity
        && stats.alignment_length >= thresholds.min_alignment_length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(alignment_length: i64, identities: i64) -> bool {
        is_mapped(
            &ReadStats {
                alignment_length,
                identities,
            },
            &Thresholds::default(),
        )
    }

    #[test]
    fn test_long_identical_alignment_qualifies() {
        assert!(check(100, 95));
    }

    #[test]
    fn test_short_alignment_is_rejected() {
        assert!(!check(90, 90));
    }

    #[test]
    fn test_low_identity_alignment_is_rejected() {
        assert!(!check(200, 80));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert!(check(100, 50));
    }

    #[test]
    fn test_zero_length_alignment_is_rejected() {
        assert!(!check(0, 0));
    }

    #[test]
    fn test_negative_identities_are_rejected() {
        assert!(!check(100, -5));
    }

    #[test]
    fn test_longer_alignment_keeps_qualifying() {
        // Scaling a passing alignment up must not flip the decision.
        assert!(check(150, 75));
        assert!(check(1000, 500));
    }

    #[test]
    fn test_higher_identity_keeps_qualifying() {
        assert!(check(100, 80));
        assert!(check(100, 100));
    }
}
