use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, event, instrument, trace};

use crate::core::{CardError, Deck};
use crate::counters::RunCounters;

use super::{InvalidGame, RecordError};

/// One side of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerRecord {
    pub tag: String,
    pub deck: Deck,
}

/// A validated two player game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameRecord {
    pub timestamp: DateTime<Utc>,
    /// True when the date could not be parsed and the epoch was used instead.
    pub timestamp_is_fallback: bool,
    pub round: i64,
    /// Slot (0 or 1) of the winning player
    pub winner_slot: usize,
    pub players: [PlayerRecord; 2],
}

impl GameRecord {
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Key that sends every submission of the same matchup to one group.
    pub fn pair_key(&self) -> CanonicalPairKey {
        CanonicalPairKey::new(&self.players[0].tag, &self.players[1].tag, self.round)
    }

    /// 1 when the player in `slot` won, 0 otherwise.
    pub fn win_indicator(&self, slot: usize) -> u64 {
        u64::from(self.winner_slot == slot)
    }
}

/// Order independent identity of a matchup: `min|max|round`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct CanonicalPairKey(String);

impl CanonicalPairKey {
    pub fn new(tag_a: &str, tag_b: &str, round: i64) -> Self {
        let (min, max) = if tag_a <= tag_b {
            (tag_a, tag_b)
        } else {
            (tag_b, tag_a)
        };
        CanonicalPairKey(format!("{min}|{max}|{round}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    utag: Option<String>,
    deck: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    date: Option<String>,
    round: Option<i64>,
    winner: Option<i64>,
    players: Option<Vec<RawPlayer>>,
}

/// Parse an ISO-8601 UTC timestamp.
///
/// Full RFC 3339 strings are accepted first. Anything else is cut to its
/// `YYYY-MM-DDTHH:MM:SS` prefix, ignoring a trailing `Z` and any fractional
/// part, and read as UTC.
pub fn parse_timestamp(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }

    let cleaned = date.trim_end_matches('Z');
    let prefix = cleaned.get(..19).unwrap_or(cleaned);
    NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Turns raw JSON lines into validated [`GameRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    /// Reject records with unparsable dates instead of using the epoch.
    pub strict_timestamps: bool,
}

impl RecordParser {
    pub fn new(strict_timestamps: bool) -> Self {
        Self { strict_timestamps }
    }

    /// Parse and validate a single line.
    ///
    /// No repair is attempted, any violation rejects the whole record.
    pub fn parse(&self, line: &str) -> Result<GameRecord, RecordError> {
        let raw: RawGame = serde_json::from_str(line)?;
        Ok(self.validate(raw)?)
    }

    fn validate(&self, raw: RawGame) -> Result<GameRecord, InvalidGame> {
        let date = raw
            .date
            .filter(|d| !d.is_empty())
            .ok_or(InvalidGame::MissingField("date"))?;
        let round = raw.round.ok_or(InvalidGame::MissingField("round"))?;
        let winner = raw.winner.ok_or(InvalidGame::MissingField("winner"))?;
        let players = raw.players.ok_or(InvalidGame::MissingField("players"))?;

        if players.len() != 2 {
            return Err(InvalidGame::PlayerCount(players.len()));
        }
        let winner_slot = match winner {
            0 => 0,
            1 => 1,
            other => return Err(InvalidGame::WinnerSlot(other)),
        };

        let mut validated = Vec::with_capacity(2);
        for (slot, player) in players.into_iter().enumerate() {
            validated.push(validate_player(slot, player)?);
        }

        let (timestamp, timestamp_is_fallback) = match parse_timestamp(&date) {
            Some(ts) => (ts, false),
            None if self.strict_timestamps => {
                return Err(InvalidGame::UnparsableTimestamp(date));
            }
            None => {
                trace!(date = %date, "Unparsable date, falling back to the epoch");
                (DateTime::<Utc>::default(), true)
            }
        };

        let [first, second]: [PlayerRecord; 2] = validated
            .try_into()
            .map_err(|v: Vec<PlayerRecord>| InvalidGame::PlayerCount(v.len()))?;

        Ok(GameRecord {
            timestamp,
            timestamp_is_fallback,
            round,
            winner_slot,
            players: [first, second],
        })
    }
}

fn validate_player(slot: usize, raw: RawPlayer) -> Result<PlayerRecord, InvalidGame> {
    let tag = raw.utag.ok_or(InvalidGame::MissingField("utag"))?;
    if tag.is_empty() {
        return Err(InvalidGame::EmptyPlayerTag { slot });
    }
    let deck = raw.deck.ok_or(InvalidGame::MissingField("deck"))?;
    let deck = deck.parse::<Deck>().map_err(|e| match e {
        CardError::DeckLength { found, .. } => InvalidGame::DeckLength { slot, found },
        _ => InvalidGame::DeckNotHex { slot },
    })?;
    Ok(PlayerRecord { tag, deck })
}

/// The validation stage.
///
/// Every rejected line is counted by reason and skipped. Blank lines are
/// ignored entirely.
#[instrument(level = "debug", skip(lines, counters))]
pub fn validate_lines<I, S>(
    lines: I,
    parser: &RecordParser,
    counters: &mut RunCounters,
) -> Vec<GameRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut games = Vec::new();
    for (line_no, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        counters.records_read += 1;
        match parser.parse(line) {
            Ok(game) => {
                if game.timestamp_is_fallback {
                    counters.unparsable_timestamps += 1;
                }
                games.push(game);
            }
            Err(e) => {
                debug!(line_no, error = %e, "Skipping record");
                counters.reject(e.reason());
            }
        }
    }

    event!(
        tracing::Level::INFO,
        records_read = counters.records_read,
        valid = games.len(),
        rejected = counters.total_rejected(),
        "Validated input records"
    );
    games
}
