//! `confab serve` — Start the HTTP API server.

use confab_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    println!("💬 Confab Gateway");
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!("   Model:     {} via {}", config.model, config.provider.name);
    println!("   Tools:     {}", config.tools_path.display());

    confab_gateway::start(config).await?;

    Ok(())
}
