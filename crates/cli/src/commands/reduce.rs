//! `dbtchat reduce`: Show the manifest context the assistant would receive.

use dbtchat_config::AppConfig;
use dbtchat_context::{ManifestReducer, Reduction};
use std::path::PathBuf;

pub async fn run(path: PathBuf, threshold: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let threshold = match threshold {
        Some(0) => return Err("--threshold must be > 0".into()),
        Some(bytes) => bytes,
        None => AppConfig::load()
            .map_err(|e| format!("Failed to load config: {e}"))?
            .manifest
            .reduction_threshold_bytes,
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

    let reducer = ManifestReducer::new(threshold);
    let strategy = reducer.strategy(&text);
    let context = reducer.reduce(&text)?;

    let label = match strategy {
        Reduction::PassThrough => "pass-through",
        Reduction::Summarize => "summarized",
    };
    eprintln!(
        "{label}: {} bytes -> {} bytes (threshold {threshold})",
        text.len(),
        context.len()
    );
    println!("{context}");

    Ok(())
}
