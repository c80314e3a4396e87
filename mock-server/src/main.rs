use std::str::FromStr;

use mock_server::Catalog;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("KONF_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from_str(&level)?)
        .init();

    // KONF_SEED points at a catalog JSON file; the bundled one is the default.
    let catalog = match std::env::var("KONF_SEED") {
        Ok(path) => Catalog::from_json(&std::fs::read_to_string(&path)?)?,
        Err(_) => Catalog::bundled()?,
    };
    info!(sessions = catalog.sessions.len(), "catalog loaded");

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run_with(listener, catalog).await?;
    Ok(())
}
