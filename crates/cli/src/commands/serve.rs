//! `vahed serve`: start the HTTP API server.

use std::path::Path;
use vahed_config::AppConfig;

pub async fn run(config_path: &Path, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load_with_env(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("vahed gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.provider, config.model);
    println!("   Embedder:  {}", config.retrieval.embedding_provider);

    vahed_gateway::start(config).await?;

    Ok(())
}
