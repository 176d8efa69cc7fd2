use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::poll::poll_loop::MIN_POLL_INTERVAL;
use crate::transport::http::DEFAULT_BACKEND;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "pummeluff-console",
    version,
    about = "Tag registration console for Mopidy Pummeluff"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the Mopidy HTTP server
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Path to config file (default: pummeluff-console.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Fields shared by register and unregister.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TagArgs {
    /// Tag UID
    #[arg(long)]
    pub uid: String,

    /// Human-readable alias
    #[arg(long, default_value = "")]
    pub alias: String,

    /// Action parameter
    #[arg(long, default_value = "")]
    pub parameter: String,

    /// Action class (default: first available)
    #[arg(long)]
    pub action: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive console: watch for scans and edit the registry
    Watch {
        /// Poll interval in milliseconds
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Append a JSONL trace of console events to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print the tag registry
    Registry {
        /// Output format: console, html
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the available action classes
    Actions,

    /// Show the most recently scanned tag
    Latest,

    /// Register a tag
    Register(TagArgs),

    /// Unregister a tag
    Unregister(TagArgs),
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `pummeluff-console.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    pub trace_file: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            trace_file: None,
        }
    }
}

// Serde default helpers
fn default_timeout_ms() -> u64 { 5000 }
fn default_poll_interval_ms() -> u64 { 1000 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("pummeluff-console.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolution (CLI > config > defaults)
// ============================================================================

pub fn resolve_backend(cli_backend: Option<&str>, config: &AppConfig) -> String {
    cli_backend
        .or(config.backend.url.as_deref())
        .unwrap_or(DEFAULT_BACKEND)
        .to_string()
}

pub fn resolve_timeout(config: &AppConfig) -> Duration {
    Duration::from_millis(config.backend.timeout_ms.max(1))
}

/// Poll interval for `watch`. Zero is bumped to 1 ms so the loop never spins.
pub fn resolve_poll_interval(cli_interval_ms: Option<u64>, config: &AppConfig) -> Duration {
    let ms = cli_interval_ms.unwrap_or(config.watch.poll_interval_ms);
    Duration::from_millis(ms).max(MIN_POLL_INTERVAL)
}

pub fn resolve_trace_file(cli_trace: Option<&str>, config: &AppConfig) -> Option<String> {
    cli_trace
        .map(str::to_string)
        .or_else(|| config.watch.trace_file.clone())
}
