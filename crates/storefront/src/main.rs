mod app;
mod commands;
mod config;
mod error;
mod view;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    // Logs go to stderr; stdout carries the result listing.
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "storefront={level},catalog={level}",
            level = config.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let app = app::App::new(&config)?;
    app.run().await?;
    Ok(())
}
