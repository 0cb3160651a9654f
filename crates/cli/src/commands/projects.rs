//! `dbtchat projects`: List the portal catalog.

use dbtchat_config::AppConfig;
use dbtchat_portal::ProjectCatalog;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let projects = ProjectCatalog::new(&config.portal_dir).list().await?;

    if projects.is_empty() {
        println!("No projects found in {}", config.portal_dir.display());
        return Ok(());
    }

    println!("{:<24} {:<28} {:>7} {:<10} UPDATED", "NAME", "DISPLAY NAME", "MODELS", "DBT");
    for project in projects {
        let updated = project
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<24} {:<28} {:>7} {:<10} {}",
            project.name, project.display_name, project.model_count, project.dbt_version, updated
        );
    }

    Ok(())
}
