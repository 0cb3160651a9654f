//! `dbtchat init`: Write a starter config file.

use dbtchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set portal_dir to the directory holding your dbt projects");
    println!("   2. Point [assistant] endpoint_url at the assistant relay");
    println!("   3. Run: dbtchat doctor");

    Ok(())
}
