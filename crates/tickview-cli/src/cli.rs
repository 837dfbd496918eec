//! CLI argument definitions for tickview.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the Stock Tracker page |
//! | `show` | Run one render pass and print it |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--timeout-ms` | `TICKVIEW_TIMEOUT_MS` or `10000` | Upstream request timeout |
//! | `--no-live-quote` | `false` | Skip the live quote fetch |
//! | `--fixture` | `false` | Use the offline synthetic Yahoo transport |
//! | `--log-level` | `TICKVIEW_LOG` or `info` | Default log filter |
//!
//! # Examples
//!
//! ```bash
//! tickview serve --bind 0.0.0.0:8501
//! tickview show MSFT --start 2015-01-01 --end 2015-01-02
//! tickview --fixture show AAPL --format json
//! ```

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickview_core::AppConfig;

/// Stock Tracker: daily price history and adjusted-close chart for one ticker.
#[derive(Debug, Parser)]
#[command(name = "tickview", author, version, about)]
pub struct Cli {
    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Do not fetch the live quote after a non-empty history.
    #[arg(long, global = true, default_value_t = false)]
    pub no_live_quote: bool,

    /// Answer from the offline synthetic Yahoo transport instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    pub fixture: bool,

    /// Default log filter, e.g. `debug` or `tickview_core=debug`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Layer the flags over the environment configuration.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if self.no_live_quote {
            config.live_quote = false;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Command::Serve(ServeArgs { bind: Some(bind) }) = &self.command {
            config.bind = *bind;
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the Stock Tracker page.
    ///
    ///   tickview serve
    ///   tickview serve --bind 0.0.0.0:8501
    Serve(ServeArgs),

    /// Run one render pass and print the result.
    ///
    ///   tickview show MSFT
    ///   tickview show MSFT --start 2015-01-01 --end 2015-01-02 --format json
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `TICKVIEW_BIND`).
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Ticker symbol; omit it to see the prompt.
    pub ticker: Option<String>,

    /// First day, `YYYY-MM-DD` (default 2015-01-01).
    #[arg(long)]
    pub start: Option<String>,

    /// End day, `YYYY-MM-DD`, exclusive (default today).
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The page body as plain text.
    Text,
    /// Inputs and outcome as pretty JSON.
    Json,
}
