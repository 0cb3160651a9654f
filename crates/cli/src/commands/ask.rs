//! `dbtchat ask`: One chat turn against the configured assistant.

use dbtchat_assistant::HttpAssistant;
use dbtchat_config::AppConfig;
use dbtchat_context::{ChatPipeline, require_fields};
use dbtchat_core::message::Turn;
use dbtchat_portal::ProjectCatalog;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    project: String,
    message: String,
    history: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    require_fields(&project, &message)?;

    let history: Vec<Turn> = match history {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read history {}: {e}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("Invalid history file: {e}"))?
        }
        None => Vec::new(),
    };

    let assistant = Arc::new(HttpAssistant::from_config(&config.assistant)?);
    let pipeline = ChatPipeline::from_config(&config, assistant)?;

    if let Some(refusal) = pipeline.screen(&message) {
        println!("{refusal}");
        return Ok(());
    }

    let manifest = ProjectCatalog::new(&config.portal_dir)
        .read_manifest(&project)
        .await?;

    // Failures print as answer text.
    let answer = pipeline.respond(&project, &manifest, &history, &message).await;
    println!("{answer}");

    Ok(())
}
