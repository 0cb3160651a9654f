//! `dbtchat serve`: Start the HTTP API server.

use dbtchat_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("dbtchat gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Portal:    {}", config.portal_dir.display());
    println!("   Assistant: {}", config.assistant.endpoint_url);

    dbtchat_gateway::start(config).await?;

    Ok(())
}
