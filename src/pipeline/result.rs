use std::path::Path;

use itertools::Itertools;

use crate::aggregate::{AggregatedStats, EdgeStat, NodeStat};
use crate::analysis::Regression;
use crate::counters::RunCounters;
use crate::join::{JoinOutput, JoinedStat};

use super::config::PipelineConfig;
use super::error::Result;
use super::streams::write_rows;

/// Matchups listed in the markdown report
const REPORT_TOP_MATCHUPS: usize = 10;

/// Everything a pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The configuration used for this run
    config: PipelineConfig,
    /// Aggregated node and edge streams
    stats: AggregatedStats,
    /// Joined statistics
    joined: JoinOutput,
    /// Fit of observed against expected counts
    regression: Option<Regression>,
    /// Counters for every stage
    counters: RunCounters,
}

impl PipelineResult {
    /// Create a new pipeline result
    pub fn new(
        config: PipelineConfig,
        stats: AggregatedStats,
        joined: JoinOutput,
        regression: Option<Regression>,
        counters: RunCounters,
    ) -> Self {
        Self {
            config,
            stats,
            joined,
            regression,
            counters,
        }
    }

    /// Get the configuration used
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[NodeStat] {
        &self.stats.nodes
    }

    pub fn edges(&self) -> &[EdgeStat] {
        &self.stats.edges
    }

    pub fn joined_stats(&self) -> &[JoinedStat] {
        &self.joined.stats
    }

    /// The total the expected counts were computed against
    pub fn total_games(&self) -> u64 {
        self.joined.total_games
    }

    /// True when the total was zero and the expected counts are unreliable
    pub fn is_degenerate(&self) -> bool {
        self.joined.degenerate
    }

    pub fn regression(&self) -> Option<&Regression> {
        self.regression.as_ref()
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Most observed matchups first
    pub fn top_matchups(&self, n: usize) -> Vec<&JoinedStat> {
        self.joined
            .stats
            .iter()
            .sorted_by(|a, b| {
                b.observed
                    .count
                    .cmp(&a.observed.count)
                    .then_with(|| (&a.source, &a.target).cmp(&(&b.source, &b.target)))
            })
            .take(n)
            .collect()
    }

    /// Format results as Markdown output
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let c = &self.counters;

        output.push_str("# Deck Matchup Statistics\n\n");

        // Configuration section
        output.push_str("## Configuration\n\n");
        output.push_str(&format!(
            "- **Archetype Size**: {}\n",
            self.config.archetype_size
        ));
        output.push_str(&format!(
            "- **Dedup Window**: {} ms\n",
            self.config.dedup_window_ms
        ));
        output.push_str(&format!("- **Partitions**: {}\n", self.config.partitions));
        output.push_str(&format!(
            "- **Strict Timestamps**: {}\n",
            self.config.strict_timestamps
        ));
        output.push_str(&format!(
            "- **Total Games**: {} ({})\n",
            self.total_games(),
            if self.config.total_games.is_some() {
                "supplied"
            } else {
                "derived from edges"
            }
        ));
        output.push('\n');

        // Input
        output.push_str("## Input\n\n");
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Records Read | {} |\n", c.records_read));
        output.push_str(&format!("| Malformed | {} |\n", c.malformed()));
        output.push_str(&format!("| Invalid Games | {} |\n", c.invalid_games()));
        for (reason, count) in &c.rejected {
            output.push_str(&format!("| Rejected: {} | {} |\n", reason.label(), count));
        }
        output.push_str(&format!(
            "| Unparsable Timestamps | {} |\n",
            c.unparsable_timestamps
        ));
        output.push_str(&format!(
            "| Duplicates Discarded | {} |\n",
            c.duplicates_discarded
        ));
        output.push_str(&format!("| Games Kept | {} |\n", c.games_kept));
        output.push('\n');

        // Aggregation
        output.push_str("## Aggregation\n\n");
        output.push_str("| Stream | Emitted | After Pre-merge | Written |\n");
        output.push_str("|--------|---------|-----------------|---------|\n");
        output.push_str(&format!(
            "| Nodes | {} | {} | {} |\n",
            c.nodes_emitted, c.nodes_combined, c.nodes_written
        ));
        output.push_str(&format!(
            "| Edges | {} | {} | {} |\n",
            c.edges_emitted, c.edges_combined, c.edges_written
        ));
        if let Some((nodes, edges)) = c.combiner_reduction() {
            output.push_str(&format!(
                "\nPre-merge reduced nodes by {:.1}% and edges by {:.1}%.\n",
                nodes, edges
            ));
        }
        output.push('\n');

        // Join
        output.push_str("## Join\n\n");
        output.push_str(&format!("- **Joined Rows**: {}\n", c.joined_rows));
        output.push_str(&format!(
            "- **Dropped (no source node)**: {}\n",
            c.dropped_missing_source
        ));
        output.push_str(&format!(
            "- **Dropped (no target node)**: {}\n",
            c.dropped_missing_target
        ));
        if self.is_degenerate() {
            output.push_str(
                "\n**Warning**: total games was zero, expected counts were computed with a divisor of 1 and are not meaningful.\n",
            );
        }
        output.push('\n');

        // Matchmaking
        output.push_str("## Matchmaking\n\n");
        match &self.regression {
            Some(fit) => {
                output.push_str("| Metric | Value |\n");
                output.push_str("|--------|-------|\n");
                output.push_str(&format!("| Slope | {:.4} |\n", fit.slope));
                output.push_str(&format!("| Intercept | {:.4} |\n", fit.intercept));
                output.push_str(&format!("| R² | {:.4} |\n", fit.r_squared));
                output.push_str(&format!("| Samples | {} |\n", fit.samples));
                output.push_str(&format!("\nVerdict: {}.\n", fit.verdict()));
            }
            None => output.push_str("Not enough usable rows to fit observed against expected.\n"),
        }
        output.push('\n');

        // Top matchups
        let top = self.top_matchups(REPORT_TOP_MATCHUPS);
        if !top.is_empty() {
            output.push_str("## Most Played Matchups\n\n");
            output.push_str("| Source | Target | Observed | Source Win Rate | Expected | Ratio |\n");
            output.push_str("|--------|--------|----------|-----------------|----------|-------|\n");
            for stat in top {
                let win_rate = stat
                    .observed
                    .win_rate()
                    .map(|w| format!("{:.1}%", w))
                    .unwrap_or_else(|| "-".to_string());
                let ratio = stat
                    .ratio()
                    .map(|r| format!("{:.2}", r))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    stat.source,
                    stat.target,
                    stat.observed.count,
                    win_rate,
                    stat.expected_text(),
                    ratio
                ));
            }
            output.push('\n');
        }

        output
    }

    /// Serialize the counters to JSON
    pub fn counters_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.counters)?)
    }

    /// Save the three streams, the counters and the report
    pub fn save_to_dir(&self, output_dir: &Path) -> Result<()> {
        // Create output directory if it doesn't exist
        std::fs::create_dir_all(output_dir)?;

        write_rows(&output_dir.join("nodes.txt"), &self.stats.nodes)?;
        write_rows(&output_dir.join("edges.txt"), &self.stats.edges)?;
        write_rows(&output_dir.join("stats.txt"), &self.joined.stats)?;

        std::fs::write(output_dir.join("counters.json"), self.counters_json()?)?;
        std::fs::write(output_dir.join("report.md"), self.to_markdown())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::aggregate::Tally;
    use crate::analysis::MIN_EXPECTED_COUNT;
    use crate::join::join;
    use crate::pipeline::streams::read_joined;
    use crate::record::RejectReason;

    fn create_test_result(total_games: u64) -> PipelineResult {
        let stats = AggregatedStats {
            nodes: vec![
                NodeStat::new("aa".into(), Tally::new(6, 4)),
                NodeStat::new("bb".into(), Tally::new(4, 1)),
                NodeStat::new("cc".into(), Tally::new(2, 1)),
            ],
            edges: vec![
                EdgeStat::new("aa".into(), "bb".into(), Tally::new(3, 2)),
                EdgeStat::new("aa".into(), "cc".into(), Tally::new(1, 1)),
                EdgeStat::new("bb".into(), "aa".into(), Tally::new(3, 1)),
                EdgeStat::new("cc".into(), "aa".into(), Tally::new(1, 0)),
            ],
        };
        let mut counters = RunCounters::new();
        counters.records_read = 7;
        counters.reject(RejectReason::Malformed);
        counters.reject(RejectReason::DeckNotHex);
        counters.games_kept = 4;
        let joined = join(&stats.nodes, &stats.edges, total_games, &mut counters);
        let regression = Regression::fit(&joined.stats, MIN_EXPECTED_COUNT);
        PipelineResult::new(
            PipelineConfig::default(),
            stats,
            joined,
            regression,
            counters,
        )
    }

    #[test]
    fn test_top_matchups() {
        let result = create_test_result(4);
        let top: Vec<(&str, &str)> = result
            .top_matchups(2)
            .into_iter()
            .map(|s| (s.source.as_str(), s.target.as_str()))
            .collect();
        assert_eq!(vec![("aa", "bb"), ("bb", "aa")], top);
    }

    #[test]
    fn test_to_markdown_contains_sections() {
        let markdown = create_test_result(4).to_markdown();
        assert!(markdown.contains("# Deck Matchup Statistics"));
        assert!(markdown.contains("## Configuration"));
        assert!(markdown.contains("## Input"));
        assert!(markdown.contains("| Rejected: non hex deck | 1 |"));
        assert!(markdown.contains("## Aggregation"));
        assert!(markdown.contains("## Join"));
        assert!(markdown.contains("## Matchmaking"));
        assert!(markdown.contains("## Most Played Matchups"));
        assert!(!markdown.contains("**Warning**"));
    }

    #[test]
    fn test_to_markdown_flags_degenerate_total() {
        let markdown = create_test_result(0).to_markdown();
        assert!(markdown.contains("**Warning**"));
    }

    #[test]
    fn test_save_to_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let result = create_test_result(4);

        result.save_to_dir(&out).unwrap();

        for name in ["nodes.txt", "edges.txt", "stats.txt", "counters.json", "report.md"] {
            assert!(out.join(name).exists(), "{name} missing");
        }
        let stats = std::fs::read_to_string(out.join("stats.txt")).unwrap();
        assert_eq!(
            Some("aa;bb;3;2;6;4;6.00"),
            stats.lines().next(),
            "rows are ordered by source then target"
        );
        assert_eq!(result.joined_stats(), read_joined(&out.join("stats.txt")).unwrap());

        let counters: RunCounters =
            serde_json::from_str(&std::fs::read_to_string(out.join("counters.json")).unwrap())
                .unwrap();
        assert_eq!(result.counters(), &counters);
    }
}
