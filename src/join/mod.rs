//! Two stage join of the aggregated streams.
//!
//! Stage one groups nodes and edges by the edge source and attaches the
//! source node count. Stage two groups the stage one rows and the nodes by
//! the edge target, attaches the target node count and computes
//!
//! ```text
//! expectedCount = countSource * countTarget / totalGames
//! ```
//!
//! Both stages run on [`group_by_key`](crate::grouping::group_by_key), one
//! key space per stage.
mod rows;
mod stages;

pub use rows::{JoinedStat, SourceJoinedRow};
pub use stages::{expected_count, join, join_source, join_target, JoinOutput};
