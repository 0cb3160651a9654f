//! `dbtchat status`: Show effective configuration.

use dbtchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("dbtchat status");
    println!("==============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Portal dir:   {}", config.portal_dir.display());
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  CORS:         {}",
        if config.gateway.allowed_origins.is_empty() {
            "any origin".to_string()
        } else {
            config.gateway.allowed_origins.join(", ")
        }
    );
    println!("  Assistant:    {}", config.assistant.endpoint_url);
    println!("  Timeout:      {}s", config.assistant.timeout_secs);
    println!(
        "  Threshold:    {} bytes",
        config.manifest.reduction_threshold_bytes
    );
    println!(
        "  Guard:        {}",
        match &config.guard.triggers {
            Some(triggers) => format!("{} custom triggers", triggers.len()),
            None => "built-in triggers".into(),
        }
    );
    println!(
        "  Template:     {}",
        config
            .prompt
            .template_file
            .as_ref()
            .map_or_else(|| "built-in".into(), |p| p.display().to_string())
    );

    if AppConfig::config_path().exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, using defaults. Run `dbtchat init` to create one.");
    }

    Ok(())
}
