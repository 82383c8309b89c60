use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::RejectReason;

/// Per-run observability counters.
///
/// Every stage takes one of these by `&mut` instead of touching global
/// state. Workers that run on separate partitions each own a local copy and
/// the copies are folded together with [`RunCounters::merge`], which is
/// associative and commutative, so the final numbers never depend on how the
/// work was split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Raw input lines seen (blank lines excluded)
    pub records_read: u64,
    /// Rejected records, by reason
    pub rejected: BTreeMap<RejectReason, u64>,
    /// Accepted records whose timestamp fell back to the epoch
    pub unparsable_timestamps: u64,
    /// Valid records dropped as duplicate submissions
    pub duplicates_discarded: u64,
    /// Games that survived deduplication
    pub games_kept: u64,

    // Generation
    pub nodes_emitted: u64,
    pub edges_emitted: u64,

    // Partition pre-merge
    pub nodes_combined: u64,
    pub edges_combined: u64,

    // Final merge
    pub nodes_written: u64,
    pub edges_written: u64,

    // Join
    pub joined_rows: u64,
    pub dropped_missing_source: u64,
    pub dropped_missing_target: u64,
    pub degenerate_expectation: bool,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one rejected record.
    pub fn reject(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_default() += 1;
    }

    pub fn rejected_for(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// Records rejected because they were not valid JSON of the right shape.
    pub fn malformed(&self) -> u64 {
        self.rejected_for(RejectReason::Malformed)
    }

    /// Records that parsed but failed a validation rule.
    pub fn invalid_games(&self) -> u64 {
        self.total_rejected() - self.malformed()
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }

    /// Percentage of generated values removed by the partition pre-merge.
    ///
    /// Returns `None` before anything was generated.
    pub fn combiner_reduction(&self) -> Option<(f64, f64)> {
        if self.nodes_emitted == 0 || self.edges_emitted == 0 {
            return None;
        }
        let nodes = (1.0 - self.nodes_combined as f64 / self.nodes_emitted as f64) * 100.0;
        let edges = (1.0 - self.edges_combined as f64 / self.edges_emitted as f64) * 100.0;
        Some((nodes, edges))
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &RunCounters) {
        self.records_read += other.records_read;
        for (reason, count) in &other.rejected {
            *self.rejected.entry(*reason).or_default() += count;
        }
        self.unparsable_timestamps += other.unparsable_timestamps;
        self.duplicates_discarded += other.duplicates_discarded;
        self.games_kept += other.games_kept;

        self.nodes_emitted += other.nodes_emitted;
        self.edges_emitted += other.edges_emitted;
        self.nodes_combined += other.nodes_combined;
        self.edges_combined += other.edges_combined;
        self.nodes_written += other.nodes_written;
        self.edges_written += other.edges_written;

        self.joined_rows += other.joined_rows;
        self.dropped_missing_source += other.dropped_missing_source;
        self.dropped_missing_target += other.dropped_missing_target;
        self.degenerate_expectation |= other.degenerate_expectation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_counts_per_reason() {
        let mut counters = RunCounters::new();
        counters.reject(RejectReason::Malformed);
        counters.reject(RejectReason::DeckNotHex);
        counters.reject(RejectReason::DeckNotHex);

        assert_eq!(1, counters.malformed());
        assert_eq!(2, counters.rejected_for(RejectReason::DeckNotHex));
        assert_eq!(0, counters.rejected_for(RejectReason::PlayerCount));
        assert_eq!(2, counters.invalid_games());
        assert_eq!(3, counters.total_rejected());
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = RunCounters::new();
        a.records_read = 10;
        a.games_kept = 7;
        a.reject(RejectReason::Malformed);

        let mut b = RunCounters::new();
        b.records_read = 5;
        b.nodes_emitted = 4;
        b.reject(RejectReason::Malformed);
        b.reject(RejectReason::WinnerSlot);
        b.degenerate_expectation = true;

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);

        assert_eq!(ab, ba);
        assert_eq!(15, ab.records_read);
        assert_eq!(2, ab.malformed());
        assert_eq!(1, ab.rejected_for(RejectReason::WinnerSlot));
        assert!(ab.degenerate_expectation);
    }

    #[test]
    fn test_combiner_reduction() {
        let counters = RunCounters {
            nodes_emitted: 200,
            nodes_combined: 50,
            edges_emitted: 100,
            edges_combined: 100,
            ..Default::default()
        };
        let (nodes, edges) = counters.combiner_reduction().unwrap();
        approx::assert_relative_eq!(75.0, nodes);
        approx::assert_relative_eq!(0.0, edges);

        assert!(RunCounters::new().combiner_reduction().is_none());
    }
}
