use clap::{Parser, Subcommand};
use docqa::{DocsError, Result};
use docqa::commands::{chat, check, embed_file, search, show_config, show_status, smoke};
use docqa::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Semantic question-answering over a local documentation corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk and embed a documentation text file into the vector store
    Embed {
        /// Path to the plain-text corpus file
        file: PathBuf,
    },
    /// Interactive chat-style search loop
    Chat,
    /// Interactive search loop with deduplicated, detailed results
    Search {
        /// Run a single query instead of the interactive loop
        query: Option<String>,
    },
    /// Run a diagnostic self-test, printing line-delimited JSON
    Check,
    /// Run a scripted smoke-test query against the store
    Smoke,
    /// Show the active configuration
    Config,
    /// Show connectivity status for the embedding server and vector store
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| DocsError::Config(format!("{e:#}")))?;

    match cli.command {
        Commands::Embed { file } => {
            embed_file(&config, &file).await?;
        }
        Commands::Chat => {
            chat(&config).await?;
        }
        Commands::Search { query } => {
            search(&config, query).await?;
        }
        Commands::Check => {
            check(&config).await?;
        }
        Commands::Smoke => {
            smoke(&config).await?;
        }
        Commands::Config => {
            show_config(&config)?;
        }
        Commands::Status => {
            show_status(&config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["docqa", "chat"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Chat);
        }
    }

    #[test]
    fn embed_command_with_file() {
        let cli = Cli::try_parse_from(["docqa", "embed", "docs.txt"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Embed { file } = parsed.command {
                assert_eq!(file, PathBuf::from("docs.txt"));
            }
        }
    }

    #[test]
    fn search_command_without_query() {
        let cli = Cli::try_parse_from(["docqa", "search"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search { query } = parsed.command {
                assert_eq!(query, None);
            }
        }
    }

    #[test]
    fn search_command_with_query() {
        let cli = Cli::try_parse_from(["docqa", "search", "how do signals work"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search { query } = parsed.command {
                assert_eq!(query, Some("how do signals work".to_string()));
            }
        }
    }

    #[test]
    fn embed_requires_file() {
        let cli = Cli::try_parse_from(["docqa", "embed"]);
        assert!(cli.is_err());
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["docqa", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["docqa", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
