use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use textdelta::{
    from_delta, levenshtein, render_inline, text2, to_delta, Cleanup, DiffAlgorithm,
    DiffAlgorithmType, Differ, DEFAULT_EDIT_COST,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "A tool for diffing texts and applying compact deltas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CleanupArg {
    None,
    Semantic,
    Lossless,
    Efficiency,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Myers,
    Similar,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Delta,
    Inline,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two files
    Diff {
        /// The original file
        #[arg(short = 'i', long)]
        old: PathBuf,

        /// The new file
        #[arg(short, long)]
        new: PathBuf,

        /// The output file (defaults to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cleanup pass applied to the raw diff
        #[arg(short, long, value_enum, default_value_t = CleanupArg::Semantic)]
        cleanup: CleanupArg,

        /// Cost of an edit for the efficiency cleanup
        #[arg(long, default_value_t = DEFAULT_EDIT_COST)]
        edit_cost: usize,

        /// Time budget in milliseconds, 0 for unlimited
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,

        /// Bisection algorithm
        #[arg(short, long, value_enum, default_value_t = AlgorithmArg::Myers)]
        algorithm: AlgorithmArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Delta)]
        format: FormatArg,
    },

    /// Rebuild the new file from the original and a delta
    Apply {
        /// The original file
        #[arg(short = 'i', long)]
        old: PathBuf,

        /// The delta file to apply
        #[arg(short, long)]
        delta: PathBuf,

        /// The output file (defaults to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the Levenshtein distance between two files
    Distance {
        /// The original file
        #[arg(short = 'i', long)]
        old: PathBuf,

        /// The new file
        #[arg(short, long)]
        new: PathBuf,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("textdelta=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diff {
            old,
            new,
            output,
            cleanup,
            edit_cost,
            timeout_ms,
            algorithm,
            format,
        } => {
            let old_content = read(&old)?;
            let new_content = read(&new)?;

            let algorithm = match algorithm {
                AlgorithmArg::Myers => DiffAlgorithmType::Myers,
                AlgorithmArg::Similar => DiffAlgorithmType::Similar,
            };
            let cleanup = match cleanup {
                CleanupArg::None => Cleanup::None,
                CleanupArg::Semantic => Cleanup::Semantic,
                CleanupArg::Lossless => Cleanup::SemanticLossless,
                CleanupArg::Efficiency => Cleanup::Efficiency { edit_cost },
            };
            let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

            let differ = Differ::new_with_algorithm(&old_content, &new_content, algorithm)
                .timeout(timeout)
                .cleanup(cleanup);
            let diffs = differ.generate();
            debug!(spans = diffs.len(), "diff generated");

            let result = match format {
                FormatArg::Delta => to_delta(&diffs),
                FormatArg::Inline => render_inline(&diffs),
            };

            match output {
                Some(path) => fs::write(path, result)?,
                None => println!("{}", result),
            }
        }

        Commands::Apply { old, delta, output } => {
            let old_content = read(&old)?;
            let delta_content = read(&delta)?;

            // A trailing newline is not part of the delta
            let diffs = from_delta(&old_content, delta_content.trim_end_matches(['\r', '\n']))
                .with_context(|| format!("Failed to apply {}", delta.display()))?;
            let result = text2(&diffs);

            match output {
                Some(path) => fs::write(path, result)?,
                None => print!("{}", result),
            }
        }

        Commands::Distance { old, new } => {
            let old_content = read(&old)?;
            let new_content = read(&new)?;

            let diffs = Differ::new(&old_content, &new_content).generate();
            println!("{}", levenshtein(&diffs));
        }
    }

    Ok(())
}
