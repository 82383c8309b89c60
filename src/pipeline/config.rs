use std::path::PathBuf;

use crate::core::ArchetypeSize;
use crate::dedup::DEFAULT_DEDUP_WINDOW_MS;

use super::error::{PipelineError, Result};

/// Configuration for a matchup statistics run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Cards per archetype node
    pub archetype_size: ArchetypeSize,
    /// Divisor for the expected counts. Derived from the edges when `None`.
    pub total_games: Option<u64>,
    /// Submissions of one pair closer than this are duplicates
    pub dedup_window_ms: u64,
    /// Reject records with an unparsable date instead of using the epoch
    pub strict_timestamps: bool,
    /// Number of pre-merge partitions
    pub partitions: usize,
    /// Optional directory the result streams and report are written to
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            archetype_size: ArchetypeSize::FULL_DECK,
            total_games: None,
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            strict_timestamps: false,
            partitions: 4,
            output_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.dedup_window_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "dedup_window_ms must be greater than 0".to_string(),
            ));
        }

        if self.partitions == 0 {
            return Err(PipelineError::InvalidConfig(
                "partitions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether node keys and edge endpoints share a key space.
    ///
    /// Edges always connect full decks, so the join can only find node
    /// counts for them when nodes are full decks too.
    pub fn joins_full_decks(&self) -> bool {
        self.archetype_size.is_full_deck()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.archetype_size.get(), 8);
        assert!(config.total_games.is_none());
        assert_eq!(config.dedup_window_ms, 10_000);
        assert!(!config.strict_timestamps);
        assert_eq!(config.partitions, 4);
        assert!(config.output_dir.is_none());
        assert!(config.joins_full_decks());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_window() {
        let config = PipelineConfig {
            dedup_window_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_zero_partitions() {
        let config = PipelineConfig {
            partitions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smaller_archetypes_do_not_join() {
        let config = PipelineConfig {
            archetype_size: ArchetypeSize::new(4).unwrap(),
            ..Default::default()
        };
        assert!(!config.joins_full_decks());
    }
}
