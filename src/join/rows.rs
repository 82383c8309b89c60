use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::Tally;
use crate::codec::{
    format_two_decimals, non_empty, parse_f64, parse_u64, round_two_decimals, split_fields,
    FormatError,
};
use crate::core::Archetype;

/// An edge after the source join: `source;target;count;wins;countSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceJoinedRow {
    pub source: Archetype,
    pub target: Archetype,
    pub observed: Tally,
    pub count_source: u64,
}

/// Final matchup row: observed counts next to the independence expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedStat {
    pub source: Archetype,
    pub target: Archetype,
    pub observed: Tally,
    pub count_source: u64,
    pub count_target: u64,
    pub expected_count: f64,
}

impl JoinedStat {
    /// `expected_count` with exactly two decimals and a `.` separator,
    /// halves rounded up.
    pub fn expected_text(&self) -> String {
        format_two_decimals(self.expected_count)
    }

    /// `expected_count` as it reads back from the stats stream.
    pub fn rounded_expected(&self) -> f64 {
        round_two_decimals(self.expected_count)
    }

    /// Observed over expected, `None` when nothing was expected.
    pub fn ratio(&self) -> Option<f64> {
        if self.expected_count > 0.0 {
            Some(self.observed.count as f64 / self.expected_count)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceJoinedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{}",
            self.source, self.target, self.observed.count, self.observed.wins, self.count_source
        )
    }
}

impl FromStr for SourceJoinedRow {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 5)?;
        Ok(SourceJoinedRow {
            source: non_empty(&fields[0], "source")?.into(),
            target: non_empty(&fields[1], "target")?.into(),
            observed: Tally::new(
                parse_u64(&fields[2], "count")?,
                parse_u64(&fields[3], "wins")?,
            ),
            count_source: parse_u64(&fields[4], "countSource")?,
        })
    }
}

impl fmt::Display for JoinedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};{};{}",
            self.source,
            self.target,
            self.observed.count,
            self.observed.wins,
            self.count_source,
            self.count_target,
            self.expected_text()
        )
    }
}

impl FromStr for JoinedStat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 7)?;
        Ok(JoinedStat {
            source: non_empty(&fields[0], "source")?.into(),
            target: non_empty(&fields[1], "target")?.into(),
            observed: Tally::new(
                parse_u64(&fields[2], "count")?,
                parse_u64(&fields[3], "wins")?,
            ),
            count_source: parse_u64(&fields[4], "countSource")?,
            count_target: parse_u64(&fields[5], "countTarget")?,
            expected_count: parse_f64(&fields[6], "expectedCount")?,
        })
    }
}
