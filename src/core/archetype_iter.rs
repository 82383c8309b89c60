use crate::core::{Archetype, ArchetypeSize, Card, Deck};

/// Given some sorted cards create every archetype of a fixed size.
///
/// Indices are always strictly increasing, so every card subset is produced
/// exactly once and, because the input is sorted, each archetype string is
/// already canonical.
#[derive(Debug)]
pub struct ArchetypeIter<'a> {
    /// All the cards that can be chosen from, in ascending order.
    possible_cards: &'a [Card],

    /// Offsets into `possible_cards` for the current subset.
    idx: Vec<usize>,

    /// Size of the subsets requested.
    num_cards: usize,

    /// Set once the current offsets have been handed out.
    started: bool,
}

impl ArchetypeIter<'_> {
    /// Create a new `ArchetypeIter` from a slice of sorted cards.
    /// `num_cards` represents how many cards each archetype holds.
    pub fn new(possible_cards: &[Card], num_cards: usize) -> ArchetypeIter<'_> {
        debug_assert!(possible_cards.windows(2).all(|w| w[0] <= w[1]));
        ArchetypeIter {
            possible_cards,
            idx: (0..num_cards).collect(),
            num_cards,
            started: false,
        }
    }

    fn current(&self) -> Archetype {
        Archetype::from_sorted_cards(self.idx.iter().map(|&i| &self.possible_cards[i]))
    }
}

impl Iterator for ArchetypeIter<'_> {
    type Item = Archetype;

    fn next(&mut self) -> Option<Archetype> {
        let n = self.possible_cards.len();
        let k = self.num_cards;
        if k == 0 || k > n {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        // Find the right most offset that can still move forward while
        // leaving room for the offsets after it.
        let level = (0..k).rev().find(|&i| self.idx[i] < n - k + i)?;
        self.idx[level] += 1;
        for i in level + 1..k {
            self.idx[i] = self.idx[i - 1] + 1;
        }

        Some(self.current())
    }
}

/// Every archetype of `size` cards drawn from the canonical form of `deck`.
pub fn deck_archetypes(deck: &Deck, size: ArchetypeSize) -> Vec<Archetype> {
    let sorted = deck.sorted();
    if size.is_full_deck() {
        return vec![Archetype::from_sorted_cards(sorted.cards())];
    }
    ArchetypeIter::new(sorted.cards(), size.get()).collect()
}
