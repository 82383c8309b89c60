//! Batch driver for the matchup statistics
//!
//! This module wires the stages together, reads input files and writes the
//! node, edge and statistics streams plus a markdown report.
//!
//! # Example
//!
//! ```ignore
//! use deck_matchups::pipeline::PipelineBuilder;
//!
//! let pipeline = PipelineBuilder::new()
//!     .archetype_size(8)
//!     .output_dir("./out")
//!     .build()?;
//!
//! let result = pipeline.run_file("games.jsonl")?;
//! if let Some(fit) = result.regression() {
//!     println!("slope {:.3}: {}", fit.slope, fit.verdict());
//! }
//! println!("{}", result.to_markdown());
//! ```

mod builder;
mod config;
mod error;
mod result;
mod runner;
mod streams;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use result::PipelineResult;
pub use runner::MatchupPipeline;
pub use streams::{read_edges, read_joined, read_nodes, write_rows};
