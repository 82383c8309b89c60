//! # deck_matchups
//!
//! Matchup statistics for two player card deck games.
//!
//! Given a log of games, one JSON record per line, this crate:
//!
//! - Validates each record and rejects it as a whole on any violation
//!   ([`record`]).
//! - Collapses repeated submissions of the same game while keeping genuine
//!   rematches ([`dedup`]).
//! - Decomposes every game into archetype nodes and full deck matchup edges
//!   ([`generate`]).
//! - Aggregates the counts with an associative merge, so the work can be
//!   split any way ([`aggregate`]).
//! - Joins node counts back onto every edge and computes how often the
//!   matchup would be expected if decks met at random ([`join`]).
//!
//! The [`pipeline`] module runs all of it over a file and writes the
//! resulting streams and a report. [`analysis`] fits observed against
//! expected counts to judge whether matchmaking looks random.

/// Cards, decks and archetypes.
pub mod core;

/// Observed vs expected regression.
pub mod analysis;

pub mod aggregate;
pub mod codec;
pub mod counters;
pub mod dedup;
pub mod generate;
pub mod grouping;
pub mod join;
pub mod pipeline;
pub mod record;

pub use aggregate::merge;
pub use dedup::clean;
pub use generate::generate;
pub use join::join;
