//! # Feed Digest
//!
//! Fetches a configured list of RSS/Atom feeds, extracts their headlines,
//! asks an LLM to group and summarize them, and serves the result to a
//! browser client.
//!
//! ## Usage
//!
//! ```sh
//! DEEPSEEK_API_KEY=sk-... feed_digest -c config.json serve --port 3000
//! DEEPSEEK_API_KEY=sk-... feed_digest -c config.json run -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: One GET per feed; failures are recorded per feed
//! 2. **Parsing**: RSS/Atom detection and title/link extraction
//! 3. **Aggregation**: Success/failure split and article statistics
//! 4. **Analysis**: One summarizer call over the combined headlines
//! 5. **Presentation**: JSON API + static shell, or terminal/JSON output

use clap::Parser;
use secrecy::SecretString;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod extract;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod server;
mod utils;

use api::{AnalysisError, ChatCompletionClient};
use cli::{Cli, Command};
use config::AiConfig;
use extract::{AnalysisExtractor, HeadingExtractor};
use feeds::FeedFetcher;
use outputs::{json, text};
use pipeline::{ensure_feeds, run_analysis, PipelineError};
use server::AppState;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_digest starting up");

    let args = Cli::parse();
    debug!(config = %args.config.display(), command = ?args.command, "Parsed CLI arguments");

    // Configuration and credential problems are fatal before any network activity.
    let config = config::load_config(&args.config).inspect_err(|e| {
        error!(error = %e, "Failed to load configuration");
    })?;

    let http = reqwest::Client::new();
    let fetcher = FeedFetcher::new(http.clone());

    match args.command {
        Command::Serve { port, public_dir } => {
            let summarizer =
                build_summarizer(http, &args.api_base_url, args.api_key, &config.ai)?;
            let state = Arc::new(AppState {
                config,
                fetcher,
                summarizer,
                extractor: Box::new(HeadingExtractor),
            });
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            server::serve(state, addr, public_dir).await?;
        }
        Command::Run { json_output_dir } => {
            // An empty feed list ends the run before the credential is required.
            if let Err(PipelineError::NoFeeds) = ensure_feeds(&config) {
                println!("No feeds found in config file");
                return Ok(());
            }
            let summarizer =
                build_summarizer(http, &args.api_base_url, args.api_key, &config.ai)?;

            if let Some(dir) = &json_output_dir {
                if let Err(e) = ensure_writable_dir(dir).await {
                    error!(
                        path = %dir,
                        error = %e,
                        "JSON output directory is not writable (fix perms or choose a different path)"
                    );
                    return Err(e);
                }
            }

            let run = run_analysis(&config, &fetcher, &summarizer)
                .await
                .inspect_err(|e| error!(error = %e, "Analysis failed"))?;

            print!("{}", text::render_run(&run));

            let extractor: &dyn AnalysisExtractor = &HeadingExtractor;
            let report = run.into_report(extractor);
            print!("{}", text::render_categories(&report.analysis));

            if let Some(dir) = &json_output_dir {
                if let Err(e) = json::write_report(&report, dir).await {
                    error!(error = %e, "Failed to write JSON report");
                }
            }

            let elapsed = start_time.elapsed();
            info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
        }
    }

    Ok(())
}

/// Build the summarizer client. A missing or empty key is fatal.
fn build_summarizer(
    http: reqwest::Client,
    base_url: &str,
    api_key: Option<String>,
    ai: &AiConfig,
) -> Result<ChatCompletionClient, AnalysisError> {
    let summarizer =
        ChatCompletionClient::new(http, base_url, api_key.map(SecretString::from), ai.clone())
            .inspect_err(|e| error!(error = %e, "Summarizer is not configured"))?;
    info!(?summarizer, "Summarizer configured");
    Ok(summarizer)
}
