use std::fs;

use anyhow::{Context, Result};

use crate::commands::{open_project_db, print_dir_status};
use crate::{canonicalize_or_current, infer_project_name};
use namer_core::db::{ProjectConfig, ProjectDb, ProjectLayout};

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    // Ensure directories exist.
    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    // Build and write project config.
    let db_path_rel = layout.db_path_relative_string();
    let config = ProjectConfig::new(&project_name, db_path_rel);
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the project database immediately so follow-on commands (and tests)
    // can rely on its presence.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized Binary Namer project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (config, db_path, db) = open_project_db(&layout)?;

    println!("Binary Namer Project Info");
    println!("=========================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path: {}", db_path.display());
    println!();

    println!("Oracle:");
    println!("  Host: {}", config.oracle.host.as_deref().unwrap_or("(unset)"));
    match config.oracle.port {
        Some(port) => println!("  Port: {}", port),
        None => println!("  Port: (unset)"),
    }
    println!("  Model: {}", config.oracle.model.as_deref().unwrap_or("(unset)"));
    match config.oracle.num_ctx {
        Some(num_ctx) => println!("  Context length: {}", num_ctx),
        None => println!("  Context length: (default)"),
    }
    println!(
        "  Configured: {}",
        if config.oracle.is_configured() { "yes" } else { "no" }
    );
    println!();

    match db.latest_snapshot()? {
        Some(snapshot) => {
            println!("Snapshot: {} (imported {})", snapshot.name, snapshot.imported_at);
        }
        None => println!("Snapshot: (none imported)"),
    }
    println!("Functions: {}", db.list_functions()?.len());
    println!("Undo steps: {}", db.list_undo_steps()?.len());
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.namer)", &layout.meta_dir);
    print_dir_status("Reports dir", &layout.reports_dir);

    Ok(())
}
