use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Card, CardError, Deck, DECK_SIZE};

/// How many cards make up one archetype.
///
/// Always in `1..=8`. The default of 8 makes every archetype a full deck.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ArchetypeSize(usize);

impl ArchetypeSize {
    pub const FULL_DECK: ArchetypeSize = ArchetypeSize(DECK_SIZE);

    pub fn new(size: usize) -> Result<Self, CardError> {
        if (1..=DECK_SIZE).contains(&size) {
            Ok(ArchetypeSize(size))
        } else {
            Err(CardError::InvalidArchetypeSize(size))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn is_full_deck(&self) -> bool {
        self.0 == DECK_SIZE
    }

    /// Number of archetypes a single deck produces, C(8, k).
    pub fn combinations(&self) -> usize {
        let k = self.0.min(DECK_SIZE - self.0);
        (0..k).fold(1, |acc, i| acc * (DECK_SIZE - i) / (i + 1))
    }
}

impl Default for ArchetypeSize {
    fn default() -> Self {
        Self::FULL_DECK
    }
}

impl TryFrom<usize> for ArchetypeSize {
    type Error = CardError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArchetypeSize> for usize {
    fn from(value: ArchetypeSize) -> Self {
        value.0
    }
}

impl fmt::Display for ArchetypeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical string for a sorted subset of one player's deck.
///
/// The string is the lowercase hex codes of the chosen cards concatenated in
/// ascending order, so equal card sets always produce equal archetypes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archetype(String);

impl Archetype {
    /// Build an archetype from cards that are already in ascending order.
    pub fn from_sorted_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut s = String::with_capacity(DECK_SIZE * 2);
        for card in cards {
            s.push_str(&card.to_string());
        }
        Archetype(s)
    }

    /// The full deck archetype for a deck in any order.
    pub fn full_deck(deck: &Deck) -> Self {
        Self::from_sorted_cards(deck.sorted().cards())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of cards in the archetype.
    pub fn len(&self) -> usize {
        self.0.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Archetype {
    fn from(value: String) -> Self {
        Archetype(value)
    }
}

impl From<&str> for Archetype {
    fn from(value: &str) -> Self {
        Archetype(value.to_string())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
