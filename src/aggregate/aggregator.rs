use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{event, instrument};

use crate::core::ArchetypeSize;
use crate::counters::RunCounters;
use crate::generate::{generate, Emission};
use crate::record::GameRecord;

use super::{EdgeStat, NodeStat, StatKey, Tally};

/// Accumulates tallies for both output streams in one map.
///
/// One `Aggregator` per partition acts as the local pre-merge. The partial
/// aggregators are then folded together with [`Aggregator::merge`] for the
/// final result.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    values: HashMap<StatKey, Tally>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: StatKey, tally: Tally) {
        *self.values.entry(key).or_default() += tally;
    }

    /// Add every delta a game emitted.
    pub fn absorb(&mut self, emission: Emission) {
        for (key, tally) in emission.into_keyed() {
            self.add(key, tally);
        }
    }

    /// Fold another partial result into this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, tally) in other.values {
            self.add(key, tally);
        }
    }

    pub fn get(&self, key: &StatKey) -> Option<Tally> {
        self.values.get(key).copied()
    }

    /// Number of distinct (node count, edge count) keys held.
    pub fn key_counts(&self) -> (usize, usize) {
        let nodes = self
            .values
            .keys()
            .filter(|k| matches!(k, StatKey::Node(_)))
            .count();
        (nodes, self.values.len() - nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split the tagged values into the node and edge streams.
    ///
    /// Both streams come out sorted by key.
    pub fn finish(self) -> AggregatedStats {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for (key, tally) in self.values.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            match key {
                StatKey::Node(archetype) => nodes.push(NodeStat::new(archetype, tally)),
                StatKey::Edge { source, target } => {
                    edges.push(EdgeStat::new(source, target, tally))
                }
            }
        }
        AggregatedStats { nodes, edges }
    }
}

/// Final node and edge aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub nodes: Vec<NodeStat>,
    pub edges: Vec<EdgeStat>,
}

impl AggregatedStats {
    /// Sum of the counts over every node.
    pub fn node_mass(&self) -> u64 {
        self.nodes.iter().map(|n| n.tally.count).sum()
    }

    /// Sum of the counts over every edge, two per game.
    pub fn edge_mass(&self) -> u64 {
        self.edges.iter().map(|e| e.tally.count).sum()
    }

    /// Number of games, one direction of the edge counts.
    pub fn total_games(&self) -> u64 {
        total_games(&self.edges)
    }
}

/// Number of games represented by a set of edges.
///
/// Every game produced one edge in each direction, so this is half the sum
/// of all edge counts.
pub fn total_games(edges: &[EdgeStat]) -> u64 {
    edges.iter().map(|e| e.tally.count).sum::<u64>() / 2
}

/// Generate and pre-merge one partition of games.
///
/// Returns the partial aggregate and the counters local to this partition.
pub fn pre_merge(games: &[GameRecord], size: ArchetypeSize) -> (Aggregator, RunCounters) {
    let mut counters = RunCounters::new();
    let mut partial = Aggregator::new();
    for game in games {
        let emission = generate(game, size);
        counters.nodes_emitted += emission.nodes.len() as u64;
        counters.edges_emitted += emission.edges.len() as u64;
        partial.absorb(emission);
    }
    let (nodes, edges) = partial.key_counts();
    counters.nodes_combined += nodes as u64;
    counters.edges_combined += edges as u64;
    (partial, counters)
}

/// Generate, pre-merge per partition, then merge everything.
///
/// `partitions` only changes how the work is split. The output is the same
/// for any value because [`Tally::merge`] is associative and commutative.
#[instrument(level = "debug", skip(games, counters), fields(num_games = games.len()))]
pub fn aggregate_games(
    games: &[GameRecord],
    size: ArchetypeSize,
    partitions: usize,
    counters: &mut RunCounters,
) -> AggregatedStats {
    let chunk_size = games.len().div_ceil(partitions.max(1)).max(1);

    #[cfg(feature = "parallel")]
    let partials: Vec<(Aggregator, RunCounters)> = {
        use rayon::prelude::*;
        games
            .par_chunks(chunk_size)
            .map(|chunk| pre_merge(chunk, size))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let partials: Vec<(Aggregator, RunCounters)> = games
        .chunks(chunk_size)
        .map(|chunk| pre_merge(chunk, size))
        .collect();

    let mut merged = Aggregator::new();
    for (partial, local) in partials {
        counters.merge(&local);
        merged.merge(partial);
    }

    let stats = merged.finish();
    counters.nodes_written += stats.nodes.len() as u64;
    counters.edges_written += stats.edges.len() as u64;

    event!(
        tracing::Level::INFO,
        archetype_size = size.get(),
        nodes = stats.nodes.len(),
        edges = stats.edges.len(),
        "Aggregated nodes and edges"
    );
    stats
}
