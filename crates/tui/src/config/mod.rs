use std::time::Duration;

use clap::Parser;
use engine::Calendar;
use serde::Deserialize;

use crate::{client::RetryPolicy, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/txdash.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// IANA name; empty means the host's local zone.
    pub timezone: String,
    pub state_path: String,
    pub log_path: String,
    pub log_level: String,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    pub search_debounce_ms: u64,
    pub tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bold-fe-api.vercel.app/api".to_string(),
            timezone: String::new(),
            state_path: "config/txdash_state.json".to_string(),
            log_path: "txdash.log".to_string(),
            log_level: "info".to_string(),
            retry_count: 3,
            retry_delay_ms: 1000,
            search_debounce_ms: 300,
            tick_ms: 200,
        }
    }
}

impl AppConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retry_count,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn calendar(&self) -> Result<Calendar> {
        Ok(self.timezone.parse::<Calendar>()?)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }
}

#[derive(Debug, Default, Parser)]
#[command(name = "txdash", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override the transactions endpoint.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Override timezone (IANA name, or "local").
    #[arg(long)]
    pub timezone: Option<String>,
    /// Override where the filter selection is saved.
    #[arg(long)]
    pub state_path: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    load_from(Args::parse())
}

pub fn load_from(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TXDASH"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    // Fail at startup rather than on the first recompute.
    settings.calendar()?;
    Ok(settings)
}
