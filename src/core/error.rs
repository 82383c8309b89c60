use thiserror::Error;

/// Errors produced while parsing cards, decks and archetype sizes.
#[derive(Error, Debug, PartialEq, Eq, Clone, Hash)]
pub enum CardError {
    #[error("Deck must be exactly {expected} hex characters, got {found}")]
    DeckLength { expected: usize, found: usize },

    #[error("Deck contains non hex characters: {0}")]
    DeckNotHex(String),

    #[error("Card code must be two hex digits, got {0:?}")]
    InvalidCardCode(String),

    #[error("Archetype size must be between 1 and 8, got {0}")]
    InvalidArchetypeSize(usize),
}
