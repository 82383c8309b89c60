use std::fmt;
use std::str::FromStr;

use super::CardError;

/// Number of cards in every deck.
pub const DECK_SIZE: usize = 8;

/// Number of hex characters in a serialized deck.
pub const DECK_HEX_LEN: usize = DECK_SIZE * 2;

/// A single card identifier.
///
/// Cards travel as two hex digits. The value is stored as a byte so that
/// ordering cards numerically is the same as ordering their lowercase hex
/// codes lexicographically.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Card(u8);

impl Card {
    pub const fn new(code: u8) -> Self {
        Card(code)
    }

    /// The raw card code.
    pub const fn code(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CardError::InvalidCardCode(s.to_string()));
        }
        u8::from_str_radix(s, 16)
            .map(Card)
            .map_err(|_| CardError::InvalidCardCode(s.to_string()))
    }
}

/// The eight cards a player brought to a game.
///
/// The order is the order the cards arrived in. Use [`Deck::sorted`] to get
/// the canonical form used for every statistic.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
}

impl Deck {
    pub fn new(cards: [Card; DECK_SIZE]) -> Self {
        Deck { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Return the canonical deck with cards in ascending order.
    pub fn sorted(&self) -> Deck {
        let mut cards = self.cards;
        cards.sort_unstable();
        Deck { cards }
    }

    pub fn is_sorted(&self) -> bool {
        self.cards.windows(2).all(|w| w[0] <= w[1])
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

impl FromStr for Deck {
    type Err = CardError;

    /// Parse a 16 character hex string. Case is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DECK_HEX_LEN {
            return Err(CardError::DeckLength {
                expected: DECK_HEX_LEN,
                found: s.chars().count(),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CardError::DeckNotHex(s.to_string()));
        }

        let mut cards = [Card(0); DECK_SIZE];
        for (i, card) in cards.iter_mut().enumerate() {
            // Every byte is ascii so slicing on even offsets is safe.
            *card = s[i * 2..i * 2 + 2].parse()?;
        }
        Ok(Deck { cards })
    }
}
