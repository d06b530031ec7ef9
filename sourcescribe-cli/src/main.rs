//! sourcescribe command-line entry point.
//!
//! Owns the composition root (`composition::build_capture_stack`) and the
//! subcommand surface. Only `capture` is fully wired; `insights`, `report`,
//! `mcp-serve`, `test-llms`, and `test-db` are out of scope for this build
//! and print a notice before exiting 0.

mod composition;

use clap::{Parser, Subcommand};
use sourcescribe_types::ConfigError;
use sourcescribe_utils::{init_logging, EnvConfigLoader, LoggerConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "sourcescribe")]
#[command(about = "Ingests a source tree and enriches it with LLM-generated summaries and embeddings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a project's source tree and persist a summarized, embedded
    /// SourceRecord per qualifying file.
    Capture {
        /// Logical project name; the partitioning key for all persisted
        /// records. Defaults to the codebase directory's basename.
        #[arg(short = 'p', long)]
        project: Option<String>,

        /// Fixed embedding vector dimension, validated against every
        /// embedding call's result.
        #[arg(long, default_value_t = 768)]
        embedding_dimension: usize,

        /// Optional config file (TOML/YAML/JSON) consulted when an
        /// environment variable is unset.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Downstream insight synthesis. Not implemented in this build.
    Insights,

    /// HTML/JSON report rendering. Not implemented in this build.
    Report,

    /// Model Context Protocol server. Not implemented in this build.
    McpServe,

    /// Connectivity smoke test against configured LLM adapters. Not
    /// implemented in this build.
    TestLlms,

    /// Connectivity smoke test against the configured store. Not
    /// implemented in this build.
    TestDb,
}

fn not_implemented(name: &str) -> i32 {
    println!("'{name}' is not implemented in this build");
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&LoggerConfig::default());

    let exit_code = match cli.command {
        Commands::Capture { project, embedding_dimension, config } => {
            run_capture(project, embedding_dimension, config).await
        }
        Commands::Insights => not_implemented("insights"),
        Commands::Report => not_implemented("report"),
        Commands::McpServe => not_implemented("mcp-serve"),
        Commands::TestLlms => not_implemented("test-llms"),
        Commands::TestDb => not_implemented("test-db"),
    };

    std::process::exit(exit_code);
}

async fn run_capture(project: Option<String>, embedding_dimension: usize, config_path: Option<PathBuf>) -> i32 {
    let file_source = match config_path {
        Some(path) => match sourcescribe_utils::ConfigSource::load_file(&path) {
            Ok(source) => Some(source),
            Err(reason) => {
                eprintln!("configuration error: {reason}");
                return 2;
            }
        },
        None => None,
    };
    let loader = EnvConfigLoader::new(file_source);

    let root = match loader.get("CODEBASE_DIR_PATH") {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("configuration error: {}", ConfigError::MissingVariables(vec!["CODEBASE_DIR_PATH".to_string()]));
            return 2;
        }
    };

    let project_name = project.unwrap_or_else(|| {
        root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "unnamed-project".to_string())
    });

    let stack = match composition::build_capture_stack(&loader, project_name, embedding_dimension) {
        Ok(stack) => stack,
        Err(reason) => {
            eprintln!("configuration error: {reason}");
            return 2;
        }
    };

    let cancellation = CancellationToken::new();
    let shutdown_signal = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_signal.cancel();
        }
    });

    let stats = std::sync::Arc::clone(&stack.stats);
    let result = stack.orchestrator.capture(stack.config, stack.walker, stack.store, stats, stack.clock, cancellation).await;

    match result {
        Ok(outcome) => {
            println!(
                "processed={} skipped_binary={} skipped_idempotent={} skipped_empty={} insert_failures={}",
                outcome.processed, outcome.skipped_binary, outcome.skipped_idempotent, outcome.skipped_empty, outcome.insert_failures
            );
            for (name, entry) in stack.stats.snapshot() {
                println!("{name} ({}): {}", entry.description, entry.count);
            }
            0
        }
        Err(reason) => {
            eprintln!("infrastructure error: {reason}");
            1
        }
    }
}
