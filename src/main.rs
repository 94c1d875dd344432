use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rag_pipeline::api;
use rag_pipeline::commands::{help_text, CommandHandler, CommandResult};
use rag_pipeline::config::{ApiKey, CompletionBackend, RagConfig};
use rag_pipeline::{ProviderSet, RagSystem};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Answer questions about a folder of text documents", long_about = None)]
struct Args {
    /// Directory containing the .txt documents to index
    #[arg(short, long)]
    docs: Option<PathBuf>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    overlap: Option<usize>,

    /// Number of chunks passed to the model as context
    #[arg(long)]
    top_k: Option<usize>,

    /// Completion backend: openai or deepseek
    #[arg(long)]
    provider: Option<CompletionBackend>,

    #[arg(short, long)]
    api_key: Option<String>,

    /// Answer a single question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Serve the HTTP API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "8000")]
    port: u16,

    /// Maximum number of queries the API processes at once
    #[arg(long, default_value = "4")]
    max_concurrent: usize,
}

fn load_config(args: &Args) -> Result<RagConfig> {
    let mut config = RagConfig::from_env()?;

    if let Some(docs) = &args.docs {
        config.documents_dir = docs.clone();
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(overlap) = args.overlap {
        config.chunk_overlap = overlap;
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(provider) = args.provider {
        config = config.with_completion_provider(provider);
    }
    if let Some(key) = &args.api_key {
        config.api_key = Some(ApiKey::new(key.clone()));
    }

    config.check()?;
    Ok(config)
}

fn build_progress_bar(show: bool) -> Result<ProgressBar> {
    if !show {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} Embedding chunks [{bar:40}] {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let providers = ProviderSet::from_config(&config)?;

    let progress = build_progress_bar(!args.api && std::io::stderr().is_terminal())?;
    let rag = RagSystem::build_with_progress(
        &config,
        providers.embedder,
        providers.completion,
        progress,
    )
    .await
    .with_context(|| format!("failed to index {}", config.documents_dir.display()))?;
    let rag = Arc::new(rag);

    if let Some(question) = &args.question {
        let answer = rag.answer_question(question).await?;
        println!("{}", answer);
        return Ok(());
    }

    if args.api {
        run_api_server(rag, args.port, args.max_concurrent).await
    } else {
        run_cli_mode(rag).await
    }
}

async fn run_cli_mode(rag: Arc<RagSystem>) -> Result<()> {
    let stats = rag.stats();
    println!(
        "{}",
        format!(
            "Indexed {} chunks from {} documents",
            stats.chunks, stats.documents
        )
        .green()
    );
    println!("{}", help_text());

    let command_handler = CommandHandler::new(rag);
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("❓ ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(CommandResult::Reply(text)) => println!("{}\n", text),
                    Ok(CommandResult::Exit) => {
                        println!("👋 Goodbye!");
                        break;
                    }
                    Ok(CommandResult::Nothing) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(rag: Arc<RagSystem>, port: u16, max_concurrent: usize) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = api::create_api(rag, max_concurrent);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    log::info!("API server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
