//! Input records: parsing, validation and canonical keys.
//!
//! Input is one JSON object per line:
//!
//! ```text
//! {"date":"2025-11-11T15:47:37Z","round":1,"winner":0,
//!  "players":[{"utag":"#A","deck":"0102030405060708"},
//!             {"utag":"#B","deck":"1112131415161718"}]}
//! ```
//!
//! Unknown fields are ignored. A record that fails any rule is rejected as a
//! whole and counted under its [`RejectReason`].
mod error;
mod game;

pub use error::{InvalidGame, RecordError, RejectReason};
pub use game::{
    parse_timestamp, validate_lines, CanonicalPairKey, GameRecord, PlayerRecord, RecordParser,
};
