use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{non_empty, parse_u64, split_fields, FormatError};
use crate::core::Archetype;

use super::Tally;

/// Occurrences of one archetype across every player side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeStat {
    pub archetype: Archetype,
    pub tally: Tally,
}

impl NodeStat {
    pub fn new(archetype: Archetype, tally: Tally) -> Self {
        Self { archetype, tally }
    }
}

/// A directed full deck matchup, wins counted for `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeStat {
    pub source: Archetype,
    pub target: Archetype,
    pub tally: Tally,
}

impl EdgeStat {
    pub fn new(source: Archetype, target: Archetype, tally: Tally) -> Self {
        Self {
            source,
            target,
            tally,
        }
    }
}

/// Aggregation key. The variant is the output stream a value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKey {
    Node(Archetype),
    Edge { source: Archetype, target: Archetype },
}

impl fmt::Display for NodeStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}",
            self.archetype, self.tally.count, self.tally.wins
        )
    }
}

impl FromStr for NodeStat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 3)?;
        Ok(NodeStat {
            archetype: non_empty(&fields[0], "archetype")?.into(),
            tally: Tally::new(
                parse_u64(&fields[1], "count")?,
                parse_u64(&fields[2], "wins")?,
            ),
        })
    }
}

impl fmt::Display for EdgeStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.source, self.target, self.tally.count, self.tally.wins
        )
    }
}

impl FromStr for EdgeStat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 4)?;
        Ok(EdgeStat {
            source: non_empty(&fields[0], "source")?.into(),
            target: non_empty(&fields[1], "target")?.into(),
            tally: Tally::new(
                parse_u64(&fields[2], "count")?,
                parse_u64(&fields[3], "wins")?,
            ),
        })
    }
}
