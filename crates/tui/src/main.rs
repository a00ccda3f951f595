mod app;
mod client;
mod config;
mod error;
mod local_state;
mod ui;

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use crate::{config::AppConfig, error::Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_tracing(&config)?;
    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}

/// Logs go to a file since the terminal belongs to the UI.
fn init_tracing(config: &AppConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.log_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    let level = &config.log_level;
    tracing_subscriber::fmt()
        .with_env_filter(format!("txdash={level},engine={level}"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
