//! Command-line interface definitions for Feed Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials and endpoints can also be supplied via environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::DEFAULT_API_BASE_URL;

/// Command-line arguments for the Feed Digest application.
///
/// # Examples
///
/// ```sh
/// # Serve the browser UI and JSON API on port 3000
/// DEEPSEEK_API_KEY=sk-... feed_digest serve
///
/// # Run the pipeline once with a YAML config and keep a JSON report
/// feed_digest -c feeds.yaml run -j ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the feeds configuration file (JSON or YAML)
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// API key for the summarizer
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible summarizer API
    #[arg(long, env = "DEEPSEEK_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the JSON API and the static application shell
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Directory holding the built browser client
        #[arg(long, default_value = "public")]
        public_dir: PathBuf,
    },
    /// Fetch, summarize and print a single digest
    Run {
        /// Output directory for a JSON report of this run
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },
}
