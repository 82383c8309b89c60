//! Duplicate submission removal.
//!
//! The same game is often reported more than once, by each player and by
//! retries, with timestamps a few seconds apart. Genuine rematches between
//! the same two players in the same round are further apart. Records are
//! grouped by [`CanonicalPairKey`](crate::record::CanonicalPairKey), sorted by
//! time, and scanned greedily: a record closer than the window to the last
//! *kept* record is a duplicate, anything else is kept and becomes the new
//! reference point.
//!
//! Dropped duplicates never become a reference point, so a burst of
//! submissions is measured from the first record that was kept.
use tracing::{event, instrument, trace};

use crate::counters::RunCounters;
use crate::grouping::group_by_key;
use crate::record::GameRecord;

/// Submissions closer together than this are the same game.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deduplicator {
    window_ms: u64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_DEDUP_WINDOW_MS,
        }
    }
}

impl Deduplicator {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Deduplicate one pair key group.
    ///
    /// The output is in ascending timestamp order. Records with equal
    /// timestamps keep their input order.
    pub fn clean_group(
        &self,
        mut group: Vec<GameRecord>,
        counters: &mut RunCounters,
    ) -> Vec<GameRecord> {
        group.sort_by_key(|g| g.timestamp);

        let mut kept: Vec<GameRecord> = Vec::with_capacity(group.len());
        for game in group {
            match kept.last() {
                Some(last)
                    if game.timestamp_millis().abs_diff(last.timestamp_millis())
                        < self.window_ms =>
                {
                    trace!(key = %game.pair_key(), "Dropping duplicate submission");
                    counters.duplicates_discarded += 1;
                }
                _ => kept.push(game),
            }
        }
        kept
    }

    /// Deduplicate every record.
    ///
    /// Groups come out in pair key order, each group in timestamp order.
    #[instrument(level = "debug", skip(records, counters), fields(num_records = records.len()))]
    pub fn clean(&self, records: Vec<GameRecord>, counters: &mut RunCounters) -> Vec<GameRecord> {
        let groups = group_by_key(records.into_iter().map(|g| (g.pair_key(), g)));

        let mut kept = Vec::new();
        for (_, group) in groups {
            kept.extend(self.clean_group(group, counters));
        }
        counters.games_kept += kept.len() as u64;

        event!(
            tracing::Level::INFO,
            games_kept = kept.len(),
            duplicates = counters.duplicates_discarded,
            "Removed duplicate submissions"
        );
        kept
    }
}

/// Deduplicate with the default ten second window.
pub fn clean(records: Vec<GameRecord>) -> Vec<GameRecord> {
    Deduplicator::default().clean(records, &mut RunCounters::new())
}
