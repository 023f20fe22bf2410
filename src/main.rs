// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sec_vectorize::utils::logging::{format_error, format_success, format_warning};
use sec_vectorize::{
    ChunkSplitter, Config, DocType, EdgarRegistry, Embedder, FilingFetcher, IngestPipeline,
    OpenAiEmbedder, QdrantStore, Validator, VectorIndex,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sec_vectorize")]
#[command(version = "0.1.0")]
#[command(about = "Ingest SEC filings into a vector index", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, chunk, embed, and upsert one filing
    Run {
        /// Exchange ticker symbol
        ticker: String,

        /// Filing form type
        #[arg(value_enum)]
        doc_type: DocType,

        /// Directory for raw filing documents (doubles as the fetch cache)
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,

        /// Re-ingest even when the filing is already in the store
        #[arg(long)]
        force: bool,
    },

    /// Check store connectivity and the collection
    Verify {
        #[arg(long)]
        create_collection: bool,
    },

    /// Search ingested chunks by semantic similarity
    Search {
        /// Search query text
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    sec_vectorize::utils::logging::init_logger(cli.color, cli.verbose);
    if !cli.color {
        colored::control::set_override(false);
    }

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    let result = match cli.command {
        Commands::Run {
            ticker,
            doc_type,
            save_dir,
            force,
        } => cmd_run(&config, &ticker, doc_type, save_dir, force).await,
        Commands::Verify { create_collection } => cmd_verify(&config, create_collection).await,
        Commands::Search { query, limit } => cmd_search(&config, &query, limit).await,
    };

    if let Err(err) = result {
        eprintln!("{}", format_error(&format!("{err:#}")));
        std::process::exit(1);
    }

    Ok(())
}

async fn cmd_run(
    config: &Config,
    ticker: &str,
    doc_type: DocType,
    save_dir: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let save_dir = save_dir.unwrap_or_else(|| config.pipeline.save_dir.clone());
    Validator::ensure_save_dir(&save_dir)
        .with_context(|| format!("save directory {} is not usable", save_dir.display()))?;

    let registry = Arc::new(EdgarRegistry::new(&config.edgar)?);
    let fetcher = FilingFetcher::new(registry, save_dir);
    let splitter = ChunkSplitter::new(config.chunking.max_size, config.chunking.overlap)?;
    let provider = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
    let embedder = Embedder::new(
        provider,
        config.embedding.batch_size,
        config.pipeline.retry_count,
    );
    let store = Arc::new(QdrantStore::new(&config.store, config.embedding.dimension)?);

    let pipeline = IngestPipeline::new(
        fetcher,
        splitter,
        embedder,
        store,
        config.pipeline.retry_count,
    )
    .with_progress(true);

    let report = pipeline.run(ticker, doc_type, force).await?;

    if report.skipped {
        info!(filing_id = report.filing_id, "skipped");
        println!(
            "{}",
            format_warning(&format!(
                "{} already ingested, use --force to re-ingest",
                report.filing_id
            ))
        );
    } else {
        info!(
            filing_id = report.filing_id,
            chunks = report.chunks,
            records_written = report.records_written,
            "ingestion complete"
        );
        println!(
            "{}",
            format_success(&format!(
                "ingested {}: {} chunks, {} records in {:.2}s",
                report.filing_id,
                report.chunks,
                report.records_written,
                report.duration.as_secs_f64()
            ))
        );
    }

    Ok(())
}

async fn cmd_verify(config: &Config, create_collection: bool) -> Result<()> {
    let store = QdrantStore::new(&config.store, config.embedding.dimension)?;

    if create_collection {
        store.ensure_collection().await?;
        println!(
            "{}",
            format_success(&format!("collection {} ready", config.store.collection))
        );
    } else {
        // Existence check against an id that cannot match doubles as a ping.
        store.exists("||").await.context("store unreachable")?;
        println!(
            "{}",
            format_success(&format!("store reachable at {}", config.store.url))
        );
    }

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, limit: usize) -> Result<()> {
    let provider = OpenAiEmbedder::new(&config.embedding)?;
    let embedder = Embedder::new(
        Arc::new(provider),
        config.embedding.batch_size,
        config.pipeline.retry_count,
    );
    let store = QdrantStore::new(&config.store, config.embedding.dimension)?;

    let mut vectors = embedder.embed(&[query.to_string()]).await?;
    let vector = vectors.pop().context("embedder returned no vector")?;

    let hits = store.search(vector, limit).await?;

    if hits.is_empty() {
        println!("{}", format_warning(&format!("no results for {:?}", query)));
        return Ok(());
    }

    println!("Results for {:?}:\n", query);
    for (idx, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} chunk {} (score {:.4})",
            idx + 1,
            hit.filing_id,
            hit.chunk_index,
            hit.score
        );
        for line in hit.chunk_text.lines().take(3) {
            println!("     {}", line);
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_accepts_known_doc_types() {
        let cli = Cli::try_parse_from(["sec_vectorize", "run", "AAPL", "10-K"]).unwrap();
        match cli.command {
            Commands::Run {
                ticker, doc_type, ..
            } => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(doc_type, DocType::TenK);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_unknown_doc_type_is_a_usage_error() {
        // Rejected at argument parsing, before any network call.
        assert!(Cli::try_parse_from(["sec_vectorize", "run", "AAPL", "10-Z"]).is_err());
    }

    #[test]
    fn test_save_dir_flag_parses() {
        let cli =
            Cli::try_parse_from(["sec_vectorize", "run", "AAPL", "8-K", "--save-dir", "/tmp/x"])
                .unwrap();
        match cli.command {
            Commands::Run { save_dir, .. } => {
                assert_eq!(save_dir, Some(PathBuf::from("/tmp/x")));
            }
            _ => panic!("expected run command"),
        }
    }
}
