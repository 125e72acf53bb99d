mod bus;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod popup;
mod render;
mod scrape;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::extract::{self, ExtractCommandArgs};
use crate::config::{AppConfig, ExplanationProvider, SettleMode};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::clipboard::CommandClipboard;
use crate::infra::endpoint::EndpointClient;
use crate::infra::file_page::FilePageHost;
use crate::infra::http_page::HttpPageHost;
use crate::infra::llm::GeminiClient;
use crate::infra::settle::{FixedDelay, PollForStability};
use crate::scrape::DiffScraper;
use crate::services::{Clipboard, ExplanationService, PageHost, SettleStrategy};

#[derive(Parser)]
#[command(
    name = "prlens",
    author,
    version,
    about = "Explain the changes on a code-review diff page"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a diff page, explain it and render the review popup.
    Extract(ExtractArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Saved review page to read.
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    file: Option<PathBuf>,
    /// Review page URL to fetch.
    #[arg(long)]
    url: Option<String>,
    /// Write the popup page here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Copy the suggested review message with the configured clipboard command.
    #[arg(long)]
    copy: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Extract(args) => run_extract(args).await,
    }
}

async fn run_extract(args: ExtractArgs) -> AppResult<()> {
    let config = AppConfig::load()?;

    match config.provider {
        ExplanationProvider::Gemini if config.gemini_api_key.is_none() => {
            eprintln!("Warning: Gemini API key not configured; explanations will fail.");
        }
        ExplanationProvider::Endpoint if config.endpoint_url.is_none() => {
            eprintln!("Warning: explanation endpoint not configured; explanations will fail.");
        }
        _ => {}
    }
    if args.copy && config.clipboard_command.is_none() {
        eprintln!("Warning: clipboard command not configured; --copy is ignored.");
    }
    if config.explain_timeout.is_none() {
        tracing::debug!("no explanation timeout configured, waiting indefinitely");
    }

    let page_host: Arc<dyn PageHost> = match (args.file, args.url) {
        (Some(path), _) => Arc::new(FilePageHost::new(path)),
        (None, Some(url)) => Arc::new(HttpPageHost::new(url)),
        (None, None) => {
            return Err(AppError::Configuration(
                "either --file or --url is required".to_string(),
            ));
        }
    };

    let explanation: Arc<dyn ExplanationService> = match config.provider {
        ExplanationProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )),
        ExplanationProvider::Endpoint => Arc::new(EndpointClient::new(config.endpoint_url.clone())),
    };

    let settle: Arc<dyn SettleStrategy> = match config.settle.mode {
        SettleMode::Fixed => Arc::new(FixedDelay),
        SettleMode::Poll => Arc::new(PollForStability::new(
            config.settle.poll_interval,
            config.settle.max_attempts,
        )),
    };

    let clipboard = config
        .clipboard_command
        .as_deref()
        .map(CommandClipboard::parse)
        .transpose()?
        .map(|clipboard| Arc::new(clipboard) as Arc<dyn Clipboard>);

    let scraper = Arc::new(DiffScraper::new(&config.selectors)?);
    let context = AppContext::new(config, page_host, explanation, settle, clipboard, scraper);

    let args = ExtractCommandArgs {
        output: args.output,
        copy: args.copy,
    };
    let popup = extract::run(&context, args.clone()).await?;
    extract::report(
        &popup,
        &args,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;

    Ok(())
}
