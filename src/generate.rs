//! Decompose a game into archetype node deltas and full deck edge deltas.
use crate::aggregate::{EdgeStat, NodeStat, StatKey, Tally};
use crate::core::{deck_archetypes, Archetype, ArchetypeSize};
use crate::record::GameRecord;

/// Everything a single game contributes to the aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    /// C(8, k) entries per side, side 0 first.
    pub nodes: Vec<NodeStat>,
    /// Exactly two entries, side 0 -> side 1 then side 1 -> side 0.
    pub edges: Vec<EdgeStat>,
}

impl Emission {
    /// Flatten into stream tagged keys for a single aggregation pass.
    pub fn into_keyed(self) -> impl Iterator<Item = (StatKey, Tally)> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|n| (StatKey::Node(n.archetype), n.tally));
        let edges = self.edges.into_iter().map(|e| {
            (
                StatKey::Edge {
                    source: e.source,
                    target: e.target,
                },
                e.tally,
            )
        });
        nodes.chain(edges)
    }
}

/// Generate the node and edge deltas for one deduplicated game.
///
/// Each side's deck is sorted, then every `size` card combination of it
/// becomes a node with a count of one and the side's win indicator. The
/// two full decks form one directed edge in each direction.
pub fn generate(game: &GameRecord, size: ArchetypeSize) -> Emission {
    let mut nodes = Vec::with_capacity(size.combinations() * 2);
    let mut full_decks = Vec::with_capacity(2);

    for (slot, player) in game.players.iter().enumerate() {
        let win = game.win_indicator(slot);
        nodes.extend(
            deck_archetypes(&player.deck, size)
                .into_iter()
                .map(|archetype| NodeStat::new(archetype, Tally::single(win))),
        );
        full_decks.push((Archetype::full_deck(&player.deck), win));
    }

    let (deck0, win0) = full_decks[0].clone();
    let (deck1, win1) = full_decks[1].clone();
    let edges = vec![
        EdgeStat::new(deck0.clone(), deck1.clone(), Tally::single(win0)),
        EdgeStat::new(deck1, deck0, Tally::single(win1)),
    ];

    Emission { nodes, edges }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::PlayerRecord;

    fn game(deck0: &str, deck1: &str, winner_slot: usize) -> GameRecord {
        GameRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            timestamp_is_fallback: false,
            round: 1,
            winner_slot,
            players: [
                PlayerRecord {
                    tag: "A".to_string(),
                    deck: deck0.parse().unwrap(),
                },
                PlayerRecord {
                    tag: "B".to_string(),
                    deck: deck1.parse().unwrap(),
                },
            ],
        }
    }

    #[test]
    fn test_full_deck_emits_one_node_per_side() {
        let emission = generate(
            &game("0807060504030201", "1112131415161718", 0),
            ArchetypeSize::FULL_DECK,
        );
        assert_eq!(2, emission.nodes.len());
        assert_eq!("0102030405060708", emission.nodes[0].archetype.as_str());
        assert_eq!(Tally::new(1, 1), emission.nodes[0].tally);
        assert_eq!(Tally::new(1, 0), emission.nodes[1].tally);
    }

    #[test]
    fn test_size_two_emits_28_per_side() {
        let emission = generate(
            &game("0102030405060708", "1112131415161718", 1),
            ArchetypeSize::new(2).unwrap(),
        );
        assert_eq!(56, emission.nodes.len());
        let side0: Vec<_> = emission
            .nodes
            .iter()
            .filter(|n| n.archetype.as_str() < "11")
            .collect();
        assert_eq!(28, side0.len());
        assert!(side0.iter().all(|n| n.tally == Tally::new(1, 0)));
    }

    #[test]
    fn test_every_size_matches_binomial() {
        let g = game("a1b2c3d4e5f60718", "0102030405060708", 0);
        for k in 1..=8 {
            let size = ArchetypeSize::new(k).unwrap();
            let emission = generate(&g, size);
            assert_eq!(2 * size.combinations(), emission.nodes.len());
            assert_eq!(2, emission.edges.len());
        }
    }

    #[test]
    fn test_edges_are_directed_with_source_wins() {
        let emission = generate(
            &game("0807060504030201", "1817161514131211", 0),
            ArchetypeSize::new(3).unwrap(),
        );
        let x = "0102030405060708";
        let y = "1112131415161718";
        assert_eq!(
            vec![
                EdgeStat::new(x.into(), y.into(), Tally::new(1, 1)),
                EdgeStat::new(y.into(), x.into(), Tally::new(1, 0)),
            ],
            emission.edges
        );
    }

    #[test]
    fn test_into_keyed_keeps_every_value() {
        let emission = generate(
            &game("0102030405060708", "1112131415161718", 1),
            ArchetypeSize::new(7).unwrap(),
        );
        let keyed: Vec<_> = emission.into_keyed().collect();
        assert_eq!(18, keyed.len());
        let edges = keyed
            .iter()
            .filter(|(k, _)| matches!(k, StatKey::Edge { .. }))
            .count();
        assert_eq!(2, edges);
    }
}
