//! Command-line front end for document question answering.
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY=... GOOGLE_API_KEY=...
//!
//! # Replace the index with the given documents
//! pdfqa ingest contract.pdf notes.txt
//! pdfqa ingest --dir ./papers
//!
//! # Ask a single question, or start a prompt loop without one
//! pdfqa ask "When does the certificate expire?"
//! pdfqa ask --sources
//!
//! pdfqa status
//! pdfqa purge
//! ```
//!
//! Set `RUST_LOG=pdfqa_rag=debug` to see retrieval statistics.

mod provider;
mod progress;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use pdfqa_openai::OpenAI;
use pdfqa_rag::{
    INDEX_UNAVAILABLE_MESSAGE, Persistence, Rag, RagError, RkyvPersistence,
};
use tracing_subscriber::EnvFilter;

use crate::provider::{ChatArgs, EmbeddingArgs};

#[derive(Debug, Parser)]
#[command(name = "pdfqa", version, about = "Ask questions about your PDF and text documents")]
struct Cli {
    /// Directory holding the persisted index.
    #[arg(long, global = true, env = "PDFQA_INDEX_DIR", default_value = "./db")]
    index_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the index with the given documents.
    Ingest {
        /// Files to ingest.
        files: Vec<PathBuf>,

        /// Ingest every file below this directory instead.
        #[arg(long, conflicts_with = "files")]
        dir: Option<PathBuf>,

        /// Do not print progress.
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        embedding: EmbeddingArgs,
    },
    /// Answer a question from the indexed documents.
    Ask {
        /// The question. Reads questions from stdin when omitted.
        question: Option<String>,

        /// Print the retrieved chunks after the answer.
        #[arg(long)]
        sources: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        embedding: EmbeddingArgs,

        #[command(flatten)]
        chat: ChatArgs,
    },
    /// Show whether an index exists and what built it.
    Status,
    /// Delete the persisted index.
    Purge,
}

/// Chunking, retrieval and provider call settings.
#[derive(Debug, Clone, Args)]
struct PipelineArgs {
    /// Maximum characters per chunk.
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[arg(long, default_value_t = 50)]
    chunk_overlap: usize,

    /// Number of chunks retrieved per question.
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Minimum cosine similarity of retrieved chunks.
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    threshold: f32,

    /// Per-call provider timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl PipelineArgs {
    const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn open(
    index_dir: PathBuf,
    pipeline: &PipelineArgs,
    embedder: OpenAI,
    generator: OpenAI,
) -> Result<Rag<OpenAI, OpenAI>> {
    let rag = Rag::builder(embedder, generator)
        .index_dir(index_dir)
        .chunking(pipeline.chunk_size, pipeline.chunk_overlap)
        .top_k(pipeline.top_k)
        .similarity_threshold(pipeline.threshold)
        .provider_timeout(pipeline.timeout())
        .build()?;
    Ok(rag)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ingest {
            files,
            dir,
            quiet,
            pipeline,
            embedding,
        } => {
            let embedder = embedding.create(pipeline.timeout())?;
            // Ingestion never generates; the embedder doubles as the unused chat client.
            let rag = open(cli.index_dir, &pipeline, embedder.clone(), embedder)?;

            let report = if let Some(dir) = dir {
                rag.ingest_directory_with_progress(&dir, progress::reporter(quiet))
                    .await?
            } else {
                if files.is_empty() {
                    bail!("pass at least one file or --dir");
                }
                rag.ingest_paths_with_progress(files, progress::reporter(quiet))
                    .await?
            };
            println!("{}", report.to_json()?);
        }
        Command::Ask {
            question,
            sources,
            pipeline,
            embedding,
            chat,
        } => {
            if let Some(message) = missing_index_message(&cli.index_dir) {
                println!("{message}");
                return Ok(());
            }

            let embedder = embedding.create(pipeline.timeout())?;
            let generator = chat.create(pipeline.timeout())?;
            let rag = open(cli.index_dir, &pipeline, embedder, generator)?;

            if let Some(question) = question {
                answer(&rag, &question, sources).await?;
            } else {
                prompt_loop(&rag, sources).await?;
            }
        }
        Command::Status => status(cli.index_dir)?,
        Command::Purge => {
            let persistence = RkyvPersistence::new(cli.index_dir);
            if persistence.remove()? {
                println!("Removed {}", persistence.path().display());
            } else {
                println!("No index at {}", persistence.path().display());
            }
        }
    }
    Ok(())
}

/// Returns the unavailable-index message when nothing has been ingested into `index_dir`.
///
/// Checked before providers are configured, so the message does not depend on API keys.
fn missing_index_message(index_dir: &Path) -> Option<&'static str> {
    (!RkyvPersistence::new(index_dir).exists()).then_some(INDEX_UNAVAILABLE_MESSAGE)
}

async fn answer(rag: &Rag<OpenAI, OpenAI>, question: &str, show_sources: bool) -> Result<()> {
    let answer = match rag.answer(question).await {
        Ok(answer) => answer,
        Err(RagError::IndexUnavailable) => {
            println!("{INDEX_UNAVAILABLE_MESSAGE}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("{}", answer.text);
    if show_sources && !answer.sources.is_empty() {
        println!();
        for source in &answer.sources {
            println!("\x1b[90m[{:.3}] {}\x1b[0m", source.score, source.chunk.id());
        }
    }
    Ok(())
}

async fn prompt_loop(rag: &Rag<OpenAI, OpenAI>, show_sources: bool) -> Result<()> {
    println!("Ask a question about your documents. /quit to exit.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "/quit" {
            break;
        }

        if let Err(err) = answer(rag, question, show_sources).await {
            eprintln!("\x1b[31merror:\x1b[0m {err:#}");
        }
        println!();
    }
    Ok(())
}

fn status(index_dir: PathBuf) -> Result<()> {
    let persistence = RkyvPersistence::new(index_dir);
    if !persistence.exists() {
        println!("Empty: no index at {}", persistence.path().display());
        return Ok(());
    }
    let index = persistence.load()?;
    println!(
        "Ready: {} chunks from {} in {}",
        index.len(),
        index.identity(),
        persistence.path().display()
    );
    Ok(())
}
