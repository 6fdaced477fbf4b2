use anyhow::{Context, Result};
use chrono::Utc;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::retriever::{self, DEFAULT_RESULT_COUNT, DocsRetriever};
use crate::splitter::split_document;
use crate::store::{ChunkRecord, EmbeddingRecord, VectorStore};

/// Fixed query used by the `smoke` self-test
const SMOKE_TEST_QUERY: &str = "How do I create a new node in the scene tree?";
const SMOKE_TEST_RESULT_COUNT: usize = 3;

/// Ingestion pipeline: read a text file, split it into overlapping chunks,
/// embed every chunk, and persist the result, overwriting any existing store
#[inline]
pub async fn embed_file(config: &Config, path: &Path) -> Result<()> {
    info!("Embedding corpus from {}", path.display());

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;

    let source = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let chunks = split_document(&text, &source, &config.chunking);
    if chunks.is_empty() {
        println!("No content to embed in {}", path.display());
        return Ok(());
    }
    println!("Split {} into {} chunks", path.display(), chunks.len());

    let client = OllamaClient::new(config)?;
    let embeddings = client
        .embed_chunks(&chunks)
        .context("Failed to generate chunk embeddings")?;

    let created_at = Utc::now().to_rfc3339();
    let records: Vec<EmbeddingRecord> = chunks
        .iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| EmbeddingRecord {
            id: Uuid::new_v4().to_string(),
            vector: embedding.embedding,
            metadata: ChunkRecord {
                source: chunk.source.clone(),
                content: chunk.content.clone(),
                chunk_index: chunk.chunk_index as u32,
                created_at: created_at.clone(),
            },
        })
        .collect();

    let mut store = VectorStore::new(config).await?;
    store.reset().await?;
    store.store_batch(records).await?;

    println!("Created vector store with {} chunks", chunks.len());
    Ok(())
}

/// Interactive chat loop using the simple result formatter
#[inline]
pub async fn chat(config: &Config) -> Result<()> {
    let retriever = DocsRetriever::new(config)
        .await
        .context("Failed to initialize retriever")?;

    println!("Documentation Chat Assistant");
    println!("Type 'quit' to exit");
    println!("{}", "-".repeat(50));

    let stdin = io::stdin();
    loop {
        print!("\nWhat would you like to know? ");
        io::stdout().flush()?;

        let Some(line) = read_line(&stdin)? else {
            break;
        };

        match classify_input(&line) {
            LoopInput::Exit => break,
            LoopInput::Empty => {}
            LoopInput::Query(query) => {
                // An error in one query is reported and the loop continues
                let result = retriever.search(query, DEFAULT_RESULT_COUNT).await;
                println!("\n{}", chat_reply(result));
            }
        }
    }

    Ok(())
}

/// Interactive search loop with deduplication and the detailed formatter.
/// An optional query argument runs a single search instead of the loop.
#[inline]
pub async fn search(config: &Config, query: Option<String>) -> Result<()> {
    let retriever = DocsRetriever::new(config)
        .await
        .context("Failed to initialize retriever")?;

    if let Some(query) = query {
        let results = retriever.search_deduped(&query, DEFAULT_RESULT_COUNT).await?;
        println!("{}", retriever::format_results_detailed(&results));
        return Ok(());
    }

    println!("{}", "=".repeat(80));
    println!("{:^80}", "Documentation Search");
    println!("{}", "=".repeat(80));
    println!("\nEnter your search queries below. Type 'quit' to exit.");
    println!("Tip: Be specific in your queries for better results!");

    let stdin = io::stdin();
    loop {
        print!("\nQuery: ");
        io::stdout().flush()?;

        let Some(line) = read_line(&stdin)? else {
            break;
        };

        match classify_input(&line) {
            LoopInput::Exit => {
                println!("\nThank you for using the documentation search!");
                break;
            }
            LoopInput::Empty => {
                println!("Please enter a valid query.");
            }
            LoopInput::Query(query) => {
                println!("\nSearching...");
                let result = retriever.search_deduped(query, DEFAULT_RESULT_COUNT).await;
                println!("{}", search_reply(result));
            }
        }
    }

    Ok(())
}

/// Diagnostic self-test emitting line-delimited JSON, exit code 1 on failure
#[inline]
pub async fn check(config: &Config) -> Result<()> {
    if let Err(e) = run_check(config).await {
        log_json("error", &e.to_string());
        for cause in e.chain().skip(1) {
            log_json("error", &cause.to_string());
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    log_json("debug", "Starting self-check");
    log_json(
        "debug",
        &format!("Version: {}", env!("CARGO_PKG_VERSION")),
    );

    if let Ok(cwd) = std::env::current_dir() {
        log_json(
            "debug",
            &format!("Current working directory: {}", cwd.display()),
        );
    }
    if let Ok(exe) = std::env::current_exe() {
        log_json("debug", &format!("Executable: {}", exe.display()));
    }

    log_json(
        "debug",
        &format!("Config directory: {}", config.base_dir.display()),
    );
    log_json(
        "debug",
        &format!("Vector store: {}", config.vector_store_path().display()),
    );
    log_json(
        "debug",
        &format!("Embedding model: {}", config.ollama.model),
    );

    let retriever = DocsRetriever::new(config)
        .await
        .context("Failed to initialize retriever")?;
    log_json("debug", "Successfully initialized retriever");
    debug!("Self-check retriever uses model {}", retriever.model());

    log_json("success", "OK");
    Ok(())
}

fn log_json(kind: &str, message: &str) {
    println!(
        "{}",
        serde_json::json!({ "type": kind, "message": message })
    );
}

/// Scripted-query smoke test: construct a retriever, run one fixed query,
/// print environment info and the formatted results
#[inline]
pub async fn smoke(config: &Config) -> Result<()> {
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Ok(exe) = std::env::current_exe() {
        println!("Executable: {}", exe.display());
    }
    if let Ok(cwd) = std::env::current_dir() {
        println!("Working directory: {}", cwd.display());
    }

    let retriever = DocsRetriever::new(config)
        .await
        .context("Failed to initialize retriever")?;

    let results = retriever
        .search(SMOKE_TEST_QUERY, SMOKE_TEST_RESULT_COUNT)
        .await?;

    println!("\nSearch Results:");
    println!("{}", retriever::format_results(&results));
    Ok(())
}

/// Print the active configuration
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    println!("Configuration ({}):", config.config_file_path().display());
    println!();
    println!("{}", content);
    println!("Vector store: {}", config.vector_store_path().display());
    Ok(())
}

/// Connectivity report for the embedding server and the vector store
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    println!("docqa status");
    println!("{}", "=".repeat(50));

    println!("Ollama:");
    match OllamaClient::new(config) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "  Connected ({}://{}:{})",
                    config.ollama.protocol, config.ollama.host, config.ollama.port
                );
                println!("  Model: {}", config.ollama.model);
                println!("  Batch size: {}", config.ollama.batch_size);
            }
            Err(e) => {
                println!("  Reachable but unhealthy: {}", e);
            }
        },
        Err(e) => {
            println!("  Failed to connect: {}", e);
        }
    }

    println!("Vector store:");
    match VectorStore::new(config).await {
        Ok(store) => {
            println!("  Open ({})", config.vector_store_path().display());
            match store.count().await {
                Ok(count) => println!("  Stored chunks: {}", count),
                Err(e) => println!("  Failed to count chunks: {}", e),
            }
        }
        Err(e) => {
            println!("  Failed to open: {}", e);
        }
    }

    Ok(())
}

/// What an interactive loop should do with one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopInput<'a> {
    /// Terminate the loop
    Exit,
    /// Re-prompt without running a search
    Empty,
    /// Run a search for this query
    Query(&'a str),
}

/// Classify a raw input line: exit keywords terminate, empty input
/// re-prompts without ever reaching the search path
fn classify_input(line: &str) -> LoopInput<'_> {
    let trimmed = line.trim();
    if is_exit_command(trimmed) {
        LoopInput::Exit
    } else if trimmed.is_empty() {
        LoopInput::Empty
    } else {
        LoopInput::Query(trimmed)
    }
}

/// Case-insensitive exit keywords shared by both interactive loops
fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Render one chat query's outcome; errors become a message so the loop
/// can keep going
fn chat_reply(result: crate::Result<Vec<retriever::RetrievedPassage>>) -> String {
    match result {
        Ok(results) => retriever::format_results(&results),
        Err(e) => format!("Error: {}\nPlease try again with a different query.", e),
    }
}

/// Render one search query's outcome for the detailed loop
fn search_reply(result: crate::Result<Vec<retriever::RetrievedPassage>>) -> String {
    match result {
        Ok(results) => format!(
            "\nSearch Results:\n{}",
            retriever::format_results_detailed(&results)
        ),
        Err(e) => format!("An error occurred: {}", e),
    }
}

fn read_line(stdin: &io::Stdin) -> Result<Option<String>> {
    let mut line = String::new();
    let bytes_read = stdin.lock().read_line(&mut line)?;
    if bytes_read == 0 {
        // EOF terminates the loop like an exit command
        return Ok(None);
    }
    Ok(Some(line))
}
