use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single input record was thrown away.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid game: {0}")]
    Invalid(#[from] InvalidGame),
}

impl RecordError {
    pub fn reason(&self) -> RejectReason {
        match self {
            RecordError::Malformed(_) => RejectReason::Malformed,
            RecordError::Invalid(invalid) => invalid.reason(),
        }
    }
}

/// A record that parsed but broke one of the validation rules.
#[derive(Error, Debug, PartialEq, Eq, Clone, Hash)]
pub enum InvalidGame {
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Expected exactly 2 players, found {0}")]
    PlayerCount(usize),

    #[error("Winner must be 0 or 1, found {0}")]
    WinnerSlot(i64),

    #[error("Player {slot} has an empty tag")]
    EmptyPlayerTag { slot: usize },

    #[error("Player {slot} deck must be 16 hex characters, found {found}")]
    DeckLength { slot: usize, found: usize },

    #[error("Player {slot} deck contains non hex characters")]
    DeckNotHex { slot: usize },

    #[error("Unparsable timestamp {0:?}")]
    UnparsableTimestamp(String),
}

impl InvalidGame {
    pub fn reason(&self) -> RejectReason {
        match self {
            InvalidGame::MissingField(_) => RejectReason::MissingField,
            InvalidGame::PlayerCount(_) => RejectReason::PlayerCount,
            InvalidGame::WinnerSlot(_) => RejectReason::WinnerSlot,
            InvalidGame::EmptyPlayerTag { .. } => RejectReason::EmptyPlayerTag,
            InvalidGame::DeckLength { .. } => RejectReason::DeckLength,
            InvalidGame::DeckNotHex { .. } => RejectReason::DeckNotHex,
            InvalidGame::UnparsableTimestamp(_) => RejectReason::UnparsableTimestamp,
        }
    }
}

/// Counter key for rejected records.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    Malformed,
    MissingField,
    PlayerCount,
    WinnerSlot,
    EmptyPlayerTag,
    DeckLength,
    DeckNotHex,
    UnparsableTimestamp,
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::Malformed => "malformed input",
            RejectReason::MissingField => "missing field",
            RejectReason::PlayerCount => "wrong player count",
            RejectReason::WinnerSlot => "bad winner slot",
            RejectReason::EmptyPlayerTag => "empty player tag",
            RejectReason::DeckLength => "bad deck length",
            RejectReason::DeckNotHex => "non hex deck",
            RejectReason::UnparsableTimestamp => "unparsable timestamp",
        }
    }
}
