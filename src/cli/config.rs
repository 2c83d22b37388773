use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::form::policy::DEFAULT_EXCLUDE;
use crate::snapshot::options::{DEFAULT_EVENTS, DEFAULT_PREFIX};
use crate::storage::file::DEFAULT_STORE_PATH;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "saveform",
    version,
    about = "Inspect and manage persisted form snapshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the snapshot store file
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Storage key prefix
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Path to config file (default: saveform.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored snapshots carrying the configured prefix
    List {
        /// Show every key in the store, regardless of prefix
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Print the snapshot stored for a form
    Show {
        /// Form id (the storage key without its prefix)
        #[arg(long)]
        form: String,
    },

    /// Remove the snapshot stored for a form
    Clear {
        /// Form id (the storage key without its prefix)
        #[arg(long)]
        form: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `saveform.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_events")]
    pub events: Vec<String>,

    #[serde(default = "default_fields")]
    pub fields: String,

    #[serde(default = "default_exclude")]
    pub exclude: String,

    #[serde(default = "default_store")]
    pub store: String,

    #[serde(default)]
    pub trace_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            events: default_events(),
            fields: default_fields(),
            exclude: default_exclude(),
            store: default_store(),
            trace_file: None,
        }
    }
}

// Serde default helpers
fn default_prefix() -> String { DEFAULT_PREFIX.to_string() }
fn default_events() -> Vec<String> { DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect() }
fn default_fields() -> String { "*".to_string() }
fn default_exclude() -> String { DEFAULT_EXCLUDE.to_string() }
fn default_store() -> String { DEFAULT_STORE_PATH.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("saveform.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Apply CLI overrides on top of the file config (CLI > config > defaults).
pub fn resolve_config(cli: &Cli, mut config: AppConfig) -> AppConfig {
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    if let Some(prefix) = &cli.prefix {
        config.prefix = prefix.clone();
    }
    config
}
