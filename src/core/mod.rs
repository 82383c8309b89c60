//! Cards, decks and the canonical archetypes built from them.
//!
//! A [`Deck`] is eight [`Card`] codes. Every statistic in this crate is keyed
//! by an [`Archetype`], which is the sorted concatenation of some subset of a
//! deck's cards. The full deck archetype (size 8) is simply the sorted deck.
mod archetype;
mod archetype_iter;
mod card;
mod error;

pub use archetype::{Archetype, ArchetypeSize};
pub use archetype_iter::{deck_archetypes, ArchetypeIter};
pub use card::{Card, Deck, DECK_HEX_LEN, DECK_SIZE};
pub use error::CardError;
