//! Associative aggregation of node and edge tallies.
//!
//! Generation runs per partition and each partition pre-merges its own
//! deltas. The partials are then merged into the final node and edge
//! streams. The only merge function is [`Tally::merge`], which is
//! associative and commutative; any replacement must keep both properties or
//! the result would depend on how the input was partitioned.
mod aggregator;
mod stats;
mod tally;

pub use aggregator::{aggregate_games, pre_merge, total_games, AggregatedStats, Aggregator};
pub use stats::{EdgeStat, NodeStat, StatKey};
pub use tally::{merge, Tally};
