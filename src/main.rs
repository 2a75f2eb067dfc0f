mod config;
mod db;
mod entities;
mod error;
mod models;
mod store;
mod ui;

use crate::{config::Config, store::Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,watchlog=debug,sqlx=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "connected");

    let store = Store::new(db);
    ui::run(&store).await?;

    Ok(())
}
