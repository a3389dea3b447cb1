mod report;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use terrace_core::SentimentLabel;
use terrace_engine::{Pipeline, PipelineOptions, SearchQuery, Session, Snapshot};
use terrace_providers::ProviderSet;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "terrace")]
#[command(about = "Football fan opinion analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate a raw post/comment batch and write the resulting snapshot.
    Analyze {
        /// JSON file shaped `{ "posts": [...] }`.
        input: PathBuf,
        /// Where to write the snapshot; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Search an analyzed snapshot.
    Search {
        snapshot: PathBuf,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        sentiment: Option<SentimentLabel>,
        #[arg(long)]
        emotion: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        min_intensity: f64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Aggregate statistics for a snapshot.
    Stats { snapshot: PathBuf },
    /// Topics discovered in a snapshot.
    Topics { snapshot: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze { input, output }) => {
            run_analyze(&input, output.as_deref()).await?;
        }
        Some(Commands::Search {
            snapshot,
            query,
            sentiment,
            emotion,
            min_intensity,
            limit,
        }) => {
            if !(0.0..=1.0).contains(&min_intensity) {
                anyhow::bail!("--min-intensity must be between 0 and 1, got {min_intensity}");
            }
            let session = load_snapshot(&snapshot)?;
            let query = SearchQuery {
                query,
                sentiment,
                emotion,
                min_intensity,
                limit: Some(limit),
            };
            report::print_opinions(&session.search(&query)?);
        }
        Some(Commands::Stats { snapshot }) => {
            let session = load_snapshot(&snapshot)?;
            report::print_statistics(&session.statistics()?);
        }
        Some(Commands::Topics { snapshot }) => {
            let session = load_snapshot(&snapshot)?;
            report::print_topics(&session.topics()?);
        }
        None => println!("no command given; run `terrace --help`"),
    }

    Ok(())
}

async fn run_analyze(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let config = terrace_core::load_app_config()?;
    let providers = ProviderSet::from_app_config(&config)?;
    let pipeline = Pipeline::new(providers, PipelineOptions::from_app_config(&config));

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let session = Session::new();
    let snapshot = session.run_batch(&pipeline, &payload).await?;
    tracing::info!(
        batch_id = %snapshot.batch_id,
        comments = snapshot.comments.len(),
        skipped = snapshot.skipped_records,
        "batch analyzed"
    );

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(snapshot.as_ref())?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            report::print_summary(&snapshot.summary());
        }
        None => println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?),
    }
    Ok(())
}

/// Restore a snapshot written by `analyze` into a fresh session.
fn load_snapshot(path: &Path) -> anyhow::Result<Session> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a terrace snapshot", path.display()))?;

    let session = Session::new();
    session.restore(snapshot);
    Ok(session)
}

#[cfg(test)]
mod tests;
