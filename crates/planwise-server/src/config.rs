//! Server configuration.
//!
//! Resolution chain: CLI flag > env var > default. The database URL and the
//! provider API key have no default; startup fails without them.

use anyhow::{Result, bail};
use clap::Parser;

use planwise_core::OpenAiConfig;
use planwise_core::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use planwise_db::config::DbConfig;

/// Default cap on a single uploaded file (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Parser)]
#[command(
    name = "planwise",
    version,
    about = "Ask a language model for feedback on weekly plans and documents"
)]
pub struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// API key for the chat-completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "PLANWISE_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Chat model identifier
    #[arg(long, env = "PLANWISE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Root URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "PLANWISE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ServerConfig {
    pub db_config: DbConfig,
    pub openai: OpenAiConfig,
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Validate parsed arguments. Blank values count as missing.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let database_url = non_blank(cli.database_url);
        let api_key = non_blank(cli.openai_api_key);

        let (database_url, api_key) = match (database_url, api_key) {
            (Some(url), Some(key)) => (url, key),
            (None, Some(_)) => bail!("missing DATABASE_URL (or --database-url)"),
            (Some(_), None) => bail!("missing OPENAI_API_KEY (or --openai-api-key)"),
            (None, None) => bail!("missing DATABASE_URL and OPENAI_API_KEY"),
        };
        if cli.max_upload_bytes == 0 {
            bail!("--max-upload-bytes must be greater than zero");
        }

        Ok(Self {
            db_config: DbConfig::new(database_url),
            openai: OpenAiConfig {
                api_key,
                model: cli.model,
                base_url: cli.openai_base_url,
            },
            bind: cli.bind,
            port: cli.port,
            max_upload_bytes: cli.max_upload_bytes,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
