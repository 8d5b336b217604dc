use serde::{Deserialize, Serialize};

/// Derived per-user credit position. Never stored; always recomputed from
/// the user row and its active packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    pub free_remaining: i32,
    pub paid_remaining: i32,
    pub total_remaining: i32,
}

impl QuotaSnapshot {
    /// Compute a snapshot from raw ledger state. Over-consumed free credit
    /// clamps to zero rather than going negative.
    pub fn compute(free_credits_used: i32, free_allowance: i32, paid_remaining: i32) -> Self {
        let free_remaining = (free_allowance - free_credits_used).max(0);
        Self {
            free_remaining,
            paid_remaining,
            total_remaining: free_remaining + paid_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_parts() {
        let snapshot = QuotaSnapshot::compute(1, 3, 5);
        assert_eq!(snapshot.free_remaining, 2);
        assert_eq!(snapshot.paid_remaining, 5);
        assert_eq!(
            snapshot.total_remaining,
            snapshot.free_remaining + snapshot.paid_remaining
        );
    }

    #[test]
    fn exhausted_free_allowance_clamps_to_zero() {
        let snapshot = QuotaSnapshot::compute(7, 3, 0);
        assert_eq!(snapshot.free_remaining, 0);
        assert_eq!(snapshot.total_remaining, 0);
    }

    #[test]
    fn fresh_user_has_full_allowance() {
        let snapshot = QuotaSnapshot::compute(0, 3, 0);
        assert_eq!(snapshot.free_remaining, 3);
        assert_eq!(snapshot.paid_remaining, 0);
        assert_eq!(snapshot.total_remaining, 3);
    }
}
