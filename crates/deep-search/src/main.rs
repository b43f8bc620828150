use anyhow::Result;
use clap::{Parser, Subcommand};
use deep_search::logging;
use deep_search_core::Dispatcher;
use deep_search_local::{EnvReport, HttpEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
#[cfg(feature = "stdio")]
mod mcp;

#[derive(Parser, Debug)]
#[command(name = "deep-search")]
#[command(
    about = "Deep web search and multi-source research (CLI + MCP stdio server)",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform a web search.
    Search(SearchCmd),
    /// Run an autonomous multi-step research task and print the finished report.
    ///
    /// This can take several minutes; there is no internal timeout.
    Research(ResearchCmd),
    /// Run as an MCP stdio server (for Claude Desktop / Cursor / MCP clients).
    #[cfg(feature = "stdio")]
    #[command(alias = "mcp-stdio")]
    Serve,
    /// Diagnose configuration (env file, credential presence, engine endpoint; no secrets).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    /// Search query.
    query: String,
    /// Search provider (brave, anthropic, openai, google, sonar, sonar-pro, sonar-deep-research, xai).
    #[arg(short, long, default_value = "brave")]
    provider: String,
    /// Maximum number of results.
    #[arg(short = 'n', long, default_value = "10")]
    max_results: String,
    /// Include AI-generated answer if available.
    #[arg(short = 'a', long)]
    include_answer: bool,
    /// Write results to this file (JSON) instead of the console.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ResearchCmd {
    /// Research topic or question.
    query: String,
    /// AI model class the research engine should use.
    #[arg(short, long, default_value = "reasoning_mini")]
    model_class: String,
    /// Write the report to this file instead of the console.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("deep-search/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn dispatcher(surface: &'static str) -> Result<Dispatcher> {
    let engine = HttpEngine::from_env(http_client()?)?;
    tracing::debug!(endpoint = %engine.endpoint(), "engine configured");
    Ok(Dispatcher::new(Arc::new(engine), logging::root_span(surface)))
}

async fn run(cli: Cli, env: EnvReport) -> Result<()> {
    match cli.command {
        Commands::Search(args) => cli::search(&dispatcher("cli")?, args).await,
        Commands::Research(args) => cli::research(&dispatcher("cli")?, args).await,
        #[cfg(feature = "stdio")]
        Commands::Serve => mcp::serve_stdio(Arc::new(dispatcher("mcp")?)).await,
        Commands::Doctor(args) => cli::doctor(&env, &args.output),
        Commands::Version(args) => {
            cli::version(&args.output);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The env file may set LOG_LEVEL, so load it before installing the subscriber.
    let env = deep_search_local::load_env();
    logging::init();
    env.log();

    match run(cli, env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", cli::error_line(&e));
            ExitCode::FAILURE
        }
    }
}
