use std::path::{Path, PathBuf};

use crate::core::ArchetypeSize;

use super::config::PipelineConfig;
use super::error::{PipelineError, Result};
use super::runner::MatchupPipeline;

/// Builder for constructing MatchupPipeline instances
///
/// # Example
///
/// ```ignore
/// use deck_matchups::pipeline::PipelineBuilder;
///
/// let pipeline = PipelineBuilder::new()
///     .archetype_size(8)
///     .partitions(8)
///     .output_dir("./out")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    archetype_size: Option<usize>,
    total_games: Option<u64>,
    dedup_window_ms: Option<u64>,
    strict_timestamps: Option<bool>,
    partitions: Option<usize>,
    output_dir: Option<PathBuf>,
}

impl PipelineBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of cards per archetype, 1 to 8
    pub fn archetype_size(mut self, archetype_size: usize) -> Self {
        self.archetype_size = Some(archetype_size);
        self
    }

    /// Use a fixed total game count instead of deriving it from the edges
    pub fn total_games(mut self, total_games: u64) -> Self {
        self.total_games = Some(total_games);
        self
    }

    /// Set the duplicate submission window in milliseconds
    pub fn dedup_window_ms(mut self, dedup_window_ms: u64) -> Self {
        self.dedup_window_ms = Some(dedup_window_ms);
        self
    }

    /// Reject records whose date cannot be parsed
    pub fn strict_timestamps(mut self, strict_timestamps: bool) -> Self {
        self.strict_timestamps = Some(strict_timestamps);
        self
    }

    /// Set the number of pre-merge partitions
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }

    /// Set the output directory for the result streams and report
    pub fn output_dir<P: AsRef<Path>>(mut self, output_dir: P) -> Self {
        self.output_dir = Some(output_dir.as_ref().to_path_buf());
        self
    }

    /// Build the MatchupPipeline
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<MatchupPipeline> {
        let defaults = PipelineConfig::default();

        let archetype_size = match self.archetype_size {
            Some(size) => ArchetypeSize::new(size)
                .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?,
            None => defaults.archetype_size,
        };

        let config = PipelineConfig {
            archetype_size,
            total_games: self.total_games,
            dedup_window_ms: self.dedup_window_ms.unwrap_or(defaults.dedup_window_ms),
            strict_timestamps: self.strict_timestamps.unwrap_or(defaults.strict_timestamps),
            partitions: self.partitions.unwrap_or(defaults.partitions),
            output_dir: self.output_dir,
        };

        MatchupPipeline::new(config)
    }
}
