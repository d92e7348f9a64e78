use anyhow::{anyhow, Context, Result};

use crate::canonicalize_or_current;
use crate::commands::{load_project_config, save_project_config};
use namer_core::db::ProjectLayout;
use namer_core::oracle::OllamaClient;

/// Configure the naming-oracle server address.
pub fn set_server_command(root: &str, host: &str, port: u16) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let mut config = load_project_config(&layout)?;

    config.oracle.host = Some(host.to_string());
    config.oracle.port = Some(port);
    save_project_config(&layout, &config)?;

    println!("Configured oracle server: {}:{}", host, port);
    if config.oracle.model.is_none() {
        println!("(No model selected yet; run `set-model`, see `list-models`.)");
    }

    Ok(())
}

/// Select the model (and optionally a context-length budget).
pub fn set_model_command(root: &str, model: &str, num_ctx: Option<u64>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let mut config = load_project_config(&layout)?;

    if config.oracle.host.is_none() || config.oracle.port.is_none() {
        return Err(anyhow!("No oracle server configured; run `set-server` first"));
    }

    config.oracle.model = Some(model.to_string());
    if num_ctx.is_some() {
        config.oracle.num_ctx = num_ctx;
    }
    save_project_config(&layout, &config)?;

    println!("Configured oracle model: {}", model);
    match config.oracle.num_ctx {
        Some(num_ctx) => println!("  Context length: {}", num_ctx),
        None => println!("  Context length: (server default)"),
    }

    Ok(())
}

/// Query the oracle server for its installed models.
pub fn list_models_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let config = load_project_config(&layout)?;

    let models = OllamaClient::list_models(&config.oracle)
        .context("Failed to list models from the oracle server")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("Available models ({}):", models.len());
    if models.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for model in models {
        let selected =
            if config.oracle.model.as_deref() == Some(model.as_str()) { " (selected)" } else { "" };
        println!("  - {}{}", model, selected);
    }

    Ok(())
}
