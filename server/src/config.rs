use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Appointy users and posts server
///
/// Only flags actually passed on the command line are serialized, so absent
/// flags leave lower layers (defaults, TOML, env) untouched.
#[derive(Parser, Serialize, Clone, Debug, Default)]
#[command(name = "appointy-server", version, about = "Appointy users and posts server")]
pub struct Cli {
    /// Port to listen on [default: 8080]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file [default: ./appointy.toml]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub generate_config: bool,

    /// Data directory for the document database [default: ./data]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// Database file name inside the data directory [default: appointy.db]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_file: Option<String>,

    /// Posts returned per page by GET /posts/users/{uid}/{page} [default: 2]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_page_size: Option<usize>,

    /// Rows fetched per round trip when scanning a collection [default: 64]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_batch_size: Option<usize>,
}

/// Resolved server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub config: String,
    pub json_logs: bool,
    pub generate_config: bool,
    pub data_dir: String,
    pub database_file: String,
    pub posts_page_size: usize,
    pub cursor_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            config: "./appointy.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            database_file: "appointy.db".to_string(),
            posts_page_size: 2,
            cursor_batch_size: 64,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (APPOINTY_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(Cli::parse()).extract()
    }

    pub fn figment(cli: Cli) -> Figment {
        let defaults = Config::default();
        let config_path = cli.config.clone().unwrap_or(defaults.config.clone());

        Figment::new()
            .merge(Serialized::defaults(defaults))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("APPOINTY_"))
            .merge(Serialized::defaults(cli))
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Appointy Server Configuration
# Place this file at ./appointy.toml or specify with --config <path>
# All settings can be overridden via environment variables (APPOINTY_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the document database
# data_dir = "./data"

# Database file name inside data_dir
# database_file = "appointy.db"

# Posts per page for GET /posts/users/{uid}/{page} (default: 2)
# posts_page_size = 2

# Rows fetched per round trip when scanning a collection (default: 64)
# cursor_batch_size = 64
"#
    .to_string()
}
