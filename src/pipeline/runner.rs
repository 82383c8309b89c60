use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{event, instrument, warn};

use crate::aggregate::{aggregate_games, AggregatedStats};
use crate::analysis::{Regression, MIN_EXPECTED_COUNT};
use crate::counters::RunCounters;
use crate::dedup::Deduplicator;
use crate::join::join;
use crate::record::{validate_lines, RecordParser};

use super::config::PipelineConfig;
use super::error::Result;
use super::result::PipelineResult;
use super::streams::{read_edges, read_nodes};

/// Runs the whole batch computation
///
/// Stages run strictly in order, each one consuming the complete output of
/// the previous one:
/// 1. Validate and canonicalize input records
/// 2. Remove duplicate submissions
/// 3. Generate node and edge deltas, pre-merged per partition
/// 4. Merge the partitions
/// 5. Join nodes onto edges and compute expected counts
#[derive(Debug, Clone)]
pub struct MatchupPipeline {
    config: PipelineConfig,
}

impl MatchupPipeline {
    /// Create a pipeline from an already assembled configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over raw input lines, one JSON record per line.
    #[instrument(level = "debug", skip(self, lines))]
    pub fn run_lines<I, S>(&self, lines: I) -> Result<PipelineResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        event!(
            tracing::Level::INFO,
            archetype_size = self.config.archetype_size.get(),
            partitions = self.config.partitions,
            strict_timestamps = self.config.strict_timestamps,
            "Starting matchup pipeline"
        );

        let mut counters = RunCounters::new();
        let parser = RecordParser::new(self.config.strict_timestamps);
        let games = validate_lines(lines, &parser, &mut counters);
        let games = Deduplicator::new(self.config.dedup_window_ms).clean(games, &mut counters);
        let stats = aggregate_games(
            &games,
            self.config.archetype_size,
            self.config.partitions,
            &mut counters,
        );

        self.finish(stats, counters)
    }

    /// Run over anything line oriented.
    pub fn run_reader<R: BufRead>(&self, reader: R) -> Result<PipelineResult> {
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        self.run_lines(lines)
    }

    /// Run over a JSON lines file.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<PipelineResult> {
        let path = path.as_ref();
        event!(tracing::Level::INFO, path = %path.display(), "Reading input");
        self.run_reader(BufReader::new(File::open(path)?))
    }

    /// Re-run only the join over previously written node and edge streams.
    pub fn join_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        nodes_path: P,
        edges_path: Q,
    ) -> Result<PipelineResult> {
        let stats = AggregatedStats {
            nodes: read_nodes(nodes_path.as_ref())?,
            edges: read_edges(edges_path.as_ref())?,
        };
        self.finish(stats, RunCounters::new())
    }

    /// Join, fit and optionally save.
    fn finish(&self, stats: AggregatedStats, mut counters: RunCounters) -> Result<PipelineResult> {
        if !self.config.joins_full_decks() {
            warn!(
                archetype_size = self.config.archetype_size.get(),
                "Edges connect full decks, node counts only match them with an archetype size of 8"
            );
        }

        let total_games = self
            .config
            .total_games
            .unwrap_or_else(|| stats.total_games());
        let joined = join(&stats.nodes, &stats.edges, total_games, &mut counters);
        let regression = Regression::fit(&joined.stats, MIN_EXPECTED_COUNT);
        if let Some(fit) = &regression {
            event!(
                tracing::Level::INFO,
                slope = fit.slope,
                r_squared = fit.r_squared,
                samples = fit.samples,
                verdict = %fit.verdict(),
                "Fitted observed against expected"
            );
        }

        let result = PipelineResult::new(self.config.clone(), stats, joined, regression, counters);
        if let Some(dir) = &self.config.output_dir {
            result.save_to_dir(dir)?;
            event!(tracing::Level::INFO, dir = %dir.display(), "Saved results");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;
    use crate::pipeline::{PipelineBuilder, PipelineError};
    use crate::record::RejectReason;

    const X: &str = "0102030405060708";
    const Y: &str = "1112131415161718";
    const Z: &str = "2122232425262728";

    fn line(date: &str, round: i64, winner: u8, a: (&str, &str), b: (&str, &str)) -> String {
        format!(
            r#"{{"date":"{date}","round":{round},"winner":{winner},"players":[{{"utag":"{}","deck":"{}"}},{{"utag":"{}","deck":"{}"}}]}}"#,
            a.0, a.1, b.0, b.1
        )
    }

    fn pipeline() -> MatchupPipeline {
        PipelineBuilder::new().partitions(2).build().unwrap()
    }

    #[test_log::test]
    fn test_window_boundary_end_to_end() {
        let lines = vec![
            line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:00:10Z", 1, 0, ("#B", Y), ("#A", X)),
            line("2025-01-01T10:00:19Z", 1, 0, ("#A", X), ("#B", Y)),
        ];
        let result = pipeline().run_lines(&lines).unwrap();

        assert_eq!(2, result.counters().games_kept);
        assert_eq!(1, result.counters().duplicates_discarded);
        assert_eq!(2, result.total_games());
    }

    #[test]
    fn test_single_game_matchup() {
        let lines = vec![line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y))];
        let result = pipeline().run_lines(&lines).unwrap();

        let edges: Vec<String> = result.edges().iter().map(|e| e.to_string()).collect();
        assert_eq!(vec![format!("{X};{Y};1;1"), format!("{Y};{X};1;0")], edges);

        let stats: Vec<String> = result.joined_stats().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            vec![format!("{X};{Y};1;1;1;1;1.00"), format!("{Y};{X};1;0;1;1;1.00")],
            stats
        );
        assert!(!result.is_degenerate());
    }

    #[test]
    fn test_bad_records_are_counted_not_fatal() {
        let lines = vec![
            "not json".to_string(),
            line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", "0102")),
            line("2025-01-01T10:00:00Z", 1, 2, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:00:00Z", 1, 1, ("#A", X), ("#B", Y)),
            String::new(),
        ];
        let result = pipeline().run_lines(&lines).unwrap();
        let counters = result.counters();

        assert_eq!(4, counters.records_read);
        assert_eq!(1, counters.malformed());
        assert_eq!(1, counters.rejected_for(RejectReason::DeckLength));
        assert_eq!(1, counters.rejected_for(RejectReason::WinnerSlot));
        assert_eq!(1, counters.games_kept);
    }

    #[test]
    fn test_expected_counts_use_derived_total() {
        // X plays Y twice and Z once, all in different rounds.
        let lines = vec![
            line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:00:00Z", 2, 0, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:00:00Z", 3, 1, ("#A", X), ("#C", Z)),
        ];
        let result = pipeline().run_lines(&lines).unwrap();
        assert_eq!(3, result.total_games());

        let xy = result
            .joined_stats()
            .iter()
            .find(|s| s.source.as_str() == X && s.target.as_str() == Y)
            .unwrap();
        // 3 * 2 / 3
        assert_eq!(format!("{X};{Y};2;2;3;2;2.00"), xy.to_string());
    }

    #[test]
    fn test_fixed_total_games() {
        let lines = vec![line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y))];
        let result = PipelineBuilder::new()
            .total_games(4)
            .build()
            .unwrap()
            .run_lines(&lines)
            .unwrap();
        assert_eq!(4, result.total_games());
        assert_eq!("0.25", result.joined_stats()[0].expected_text());
    }

    #[test]
    fn test_empty_input_is_degenerate() {
        let result = pipeline().run_lines(Vec::<String>::new()).unwrap();
        assert!(result.is_degenerate());
        assert!(result.joined_stats().is_empty());
        assert!(result.regression().is_none());
    }

    #[test]
    fn test_run_reader() {
        let input = format!(
            "{}\n\n{}\n",
            line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:05:00Z", 1, 1, ("#A", X), ("#B", Y)),
        );
        let result = pipeline().run_reader(Cursor::new(input)).unwrap();
        assert_eq!(2, result.counters().games_kept);
    }

    #[test]
    fn test_run_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = pipeline().run_file(dir.path().join("missing.jsonl"));
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_run_file_saves_and_join_files_agrees() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("games.jsonl");
        let out = dir.path().join("out");
        let lines = [
            line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y)),
            line("2025-01-01T10:00:00Z", 2, 1, ("#A", X), ("#C", Z)),
            line("2025-01-01T10:00:00Z", 3, 0, ("#B", Y), ("#C", Z)),
        ];
        std::fs::write(&input, lines.join("\n")).unwrap();

        let pipeline = PipelineBuilder::new().output_dir(&out).build().unwrap();
        let first = pipeline.run_file(&input).unwrap();
        assert!(out.join("nodes.txt").exists());
        assert!(out.join("edges.txt").exists());

        let again = MatchupPipeline::new(PipelineConfig::default())
            .unwrap()
            .join_files(out.join("nodes.txt"), out.join("edges.txt"))
            .unwrap();
        assert_eq!(first.joined_stats(), again.joined_stats());
        assert_eq!(first.total_games(), again.total_games());
    }

    #[test]
    fn test_smaller_archetypes_still_aggregate() {
        let lines = vec![line("2025-01-01T10:00:00Z", 1, 0, ("#A", X), ("#B", Y))];
        let result = PipelineBuilder::new()
            .archetype_size(2)
            .build()
            .unwrap()
            .run_lines(&lines)
            .unwrap();

        assert_eq!(56, result.nodes().len());
        assert_eq!(2, result.edges().len());
        assert!(result.joined_stats().is_empty());
        assert_eq!(2, result.counters().dropped_missing_source);
    }
}
