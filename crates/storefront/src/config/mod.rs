use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/storefront.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Key-value file holding the saved search filter.
    pub state_path: String,
    pub timeout_secs: u64,
    pub level: String,
    /// Bearer token of the logged-in user. Never read from CLI.
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            state_path: "config/storefront_state.json".to_string(),
            timeout_secs: 10,
            level: "info".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "storefront", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:9000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the saved filter file.
    #[arg(long)]
    state_path: Option<String>,
    /// Override the request timeout, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("STOREFRONT"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }

    Ok(settings)
}
