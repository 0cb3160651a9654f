//! `dbtchat doctor`: Diagnose setup problems.

use dbtchat_config::AppConfig;
use dbtchat_context::PromptTemplate;
use dbtchat_portal::ProjectCatalog;
use std::time::Duration;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("dbtchat doctor");
    println!("==============\n");

    let mut issues = 0;

    // Config
    let config = match AppConfig::load() {
        Ok(config) => {
            if AppConfig::config_path().exists() {
                println!("  [ok]   Config file valid");
            } else {
                println!("  [warn] No config file, using defaults (run `dbtchat init`)");
            }
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue found. Fix the config before running other checks.");
            return Ok(());
        }
    };

    // Portal
    match ProjectCatalog::new(&config.portal_dir).list().await {
        Ok(projects) if projects.is_empty() => {
            println!(
                "  [warn] Portal dir {} has no projects with a manifest.json",
                config.portal_dir.display()
            );
            issues += 1;
        }
        Ok(projects) => println!("  [ok]   {} project(s) in portal", projects.len()),
        Err(_) => {
            println!("  [fail] Portal dir {} is not readable", config.portal_dir.display());
            issues += 1;
        }
    }

    // Template
    if let Some(path) = &config.prompt.template_file {
        match PromptTemplate::from_file(path) {
            Ok(_) => println!("  [ok]   Prompt template loads"),
            Err(e) => {
                println!("  [fail] {e}");
                issues += 1;
            }
        }
    }

    // Assistant relay: any HTTP answer means the endpoint is listening.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    match client.get(&config.assistant.endpoint_url).send().await {
        Ok(_) => println!("  [ok]   Assistant relay reachable at {}", config.assistant.endpoint_url),
        Err(e) => {
            println!(
                "  [fail] Assistant relay unreachable at {}: {e}",
                config.assistant.endpoint_url
            );
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
