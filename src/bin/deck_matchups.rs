use std::path::PathBuf;

use clap::Parser;
use deck_matchups::pipeline::{PipelineBuilder, PipelineError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "deck-matchups",
    about = "Compute observed vs expected deck matchup statistics",
    long_about = "Reads one JSON game record per line, removes duplicate submissions,\n\
                  aggregates archetype and full deck matchup counts, and compares every\n\
                  observed matchup count with the count expected if decks met at random."
)]
struct Args {
    /// JSON lines file of game records
    #[arg(required_unless_present_all = ["nodes", "edges"])]
    input: Option<PathBuf>,

    /// Re-run only the join from a previously written node stream
    #[arg(long = "nodes", requires = "edges", conflicts_with = "input")]
    nodes: Option<PathBuf>,

    /// Re-run only the join from a previously written edge stream
    #[arg(long = "edges", requires = "nodes", conflicts_with = "input")]
    edges: Option<PathBuf>,

    /// Directory to write nodes.txt, edges.txt, stats.txt and report.md to
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Number of cards per archetype (1 to 8)
    #[arg(short = 'k', long = "archetype-size", default_value_t = 8)]
    archetype_size: usize,

    /// Use this total instead of deriving it from the edges
    #[arg(long = "total-games")]
    total_games: Option<u64>,

    /// Duplicate submission window in milliseconds
    #[arg(long = "dedup-window-ms", default_value_t = 10_000)]
    dedup_window_ms: u64,

    /// Reject records with an unparsable date
    #[arg(long = "strict-timestamps")]
    strict_timestamps: bool,

    /// Number of pre-merge partitions
    #[arg(short = 'p', long = "partitions", default_value_t = 4)]
    partitions: usize,
}

/// Uses `RUST_LOG` if set, otherwise defaults to info level.
fn init_tracing_from_env() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing_from_env();
    let args = Args::parse();

    let mut builder = PipelineBuilder::new()
        .archetype_size(args.archetype_size)
        .dedup_window_ms(args.dedup_window_ms)
        .strict_timestamps(args.strict_timestamps)
        .partitions(args.partitions);
    if let Some(total_games) = args.total_games {
        builder = builder.total_games(total_games);
    }
    if let Some(ref output_dir) = args.output_dir {
        builder = builder.output_dir(output_dir);
    }
    let pipeline = builder.build()?;

    let result = match (&args.input, &args.nodes, &args.edges) {
        (_, Some(nodes), Some(edges)) => pipeline.join_files(nodes, edges)?,
        (Some(input), _, _) => pipeline.run_file(input)?,
        _ => {
            return Err(PipelineError::InvalidConfig(
                "either an input file or both --nodes and --edges are required".to_string(),
            ))
        }
    };

    println!("{}", result.to_markdown());

    if let Some(ref output_dir) = args.output_dir {
        println!("Results saved to:");
        for name in ["nodes.txt", "edges.txt", "stats.txt", "counters.json", "report.md"] {
            println!("  - {}", output_dir.join(name).display());
        }
    }

    Ok(())
}
