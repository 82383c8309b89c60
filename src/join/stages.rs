use tracing::{event, instrument, trace, warn};

use crate::aggregate::{EdgeStat, NodeStat};
use crate::core::Archetype;
use crate::counters::RunCounters;
use crate::grouping::group_by_key;

use super::{JoinedStat, SourceJoinedRow};

/// What a join key can carry: the node count for the key, or a row waiting
/// for it.
#[derive(Debug, Clone)]
enum JoinValue<T> {
    Node(u64),
    Row(T),
}

/// Node count side of a join, keyed by archetype.
fn node_values<T>(nodes: &[NodeStat]) -> Vec<(Archetype, JoinValue<T>)> {
    nodes
        .iter()
        .map(|n| (n.archetype.clone(), JoinValue::Node(n.tally.count)))
        .collect()
}

/// Separate a key's group into its node count and its rows.
///
/// Several node entries for one key are summed.
fn split_group<T>(values: Vec<JoinValue<T>>) -> (u64, Vec<T>) {
    let mut count = 0;
    let mut rows = Vec::new();
    for value in values {
        match value {
            JoinValue::Node(c) => count += c,
            JoinValue::Row(row) => rows.push(row),
        }
    }
    (count, rows)
}

/// Expected number of meetings if both decks were matched independently.
///
/// A `total_games` of zero is replaced by 1.
pub fn expected_count(count_source: u64, count_target: u64, total_games: u64) -> f64 {
    let divisor = total_games.max(1);
    (count_source as f64 * count_target as f64) / divisor as f64
}

/// Stage one: attach each edge's source node count.
///
/// Edges whose source has no node count are dropped.
#[instrument(level = "debug", skip_all, fields(nodes = nodes.len(), edges = edges.len()))]
pub fn join_source(
    nodes: &[NodeStat],
    edges: &[EdgeStat],
    counters: &mut RunCounters,
) -> Vec<SourceJoinedRow> {
    let pairs = node_values(nodes)
        .into_iter()
        .chain(edges.iter().map(|e| (e.source.clone(), JoinValue::Row(e))));

    let mut out = Vec::with_capacity(edges.len());
    for (source, values) in group_by_key(pairs) {
        let (count_source, rows) = split_group(values);
        if count_source == 0 {
            if !rows.is_empty() {
                trace!(%source, rows = rows.len(), "No node count for source");
            }
            counters.dropped_missing_source += rows.len() as u64;
            continue;
        }
        out.extend(rows.into_iter().map(|edge| SourceJoinedRow {
            source: source.clone(),
            target: edge.target.clone(),
            observed: edge.tally,
            count_source,
        }));
    }
    out
}

/// Stage two: attach the target node count and compute the expectation.
///
/// Rows whose target has no node count are dropped.
#[instrument(level = "debug", skip_all, fields(nodes = nodes.len(), rows = rows.len()))]
pub fn join_target(
    nodes: &[NodeStat],
    rows: &[SourceJoinedRow],
    total_games: u64,
    counters: &mut RunCounters,
) -> Vec<JoinedStat> {
    let pairs = node_values(nodes)
        .into_iter()
        .chain(rows.iter().map(|r| (r.target.clone(), JoinValue::Row(r))));

    let mut out = Vec::with_capacity(rows.len());
    for (target, values) in group_by_key(pairs) {
        let (count_target, rows) = split_group(values);
        if count_target == 0 {
            counters.dropped_missing_target += rows.len() as u64;
            continue;
        }
        out.extend(rows.into_iter().map(|row| JoinedStat {
            source: row.source.clone(),
            target: target.clone(),
            observed: row.observed,
            count_source: row.count_source,
            count_target,
            expected_count: expected_count(row.count_source, count_target, total_games),
        }));
    }
    out
}

/// Result of the two stage join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutput {
    /// Rows sorted by (source, target).
    pub stats: Vec<JoinedStat>,
    /// The scalar the expectation was computed against, as supplied.
    pub total_games: u64,
    /// `total_games` was zero and 1 was used instead. The expectations are
    /// not meaningful.
    pub degenerate: bool,
}

/// Join aggregated nodes and edges into the final statistics.
///
/// Stage two starts only after stage one has produced every row, since the
/// two stages group by different keys.
#[instrument(level = "debug", skip(nodes, edges, counters))]
pub fn join(
    nodes: &[NodeStat],
    edges: &[EdgeStat],
    total_games: u64,
    counters: &mut RunCounters,
) -> JoinOutput {
    let degenerate = total_games == 0;
    if degenerate {
        warn!("Total games is zero, expected counts use a divisor of 1 and are unreliable");
        counters.degenerate_expectation = true;
    }

    let source_rows = join_source(nodes, edges, counters);
    let mut stats = join_target(nodes, &source_rows, total_games, counters);
    stats.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
    counters.joined_rows += stats.len() as u64;

    event!(
        tracing::Level::INFO,
        rows = stats.len(),
        total_games,
        dropped_source = counters.dropped_missing_source,
        dropped_target = counters.dropped_missing_target,
        "Joined matchup statistics"
    );

    JoinOutput {
        stats,
        total_games,
        degenerate,
    }
}
