use std::path::Path;

use anyhow::Result;

/// Load the project config JSON from disk (delegates to core helper).
pub fn load_project_config(
    layout: &namer_core::db::ProjectLayout,
) -> Result<namer_core::db::ProjectConfig> {
    namer_core::db::load_project_config(layout)
}

/// Write the project config JSON back to disk (delegates to core helper).
pub fn save_project_config(
    layout: &namer_core::db::ProjectLayout,
    config: &namer_core::db::ProjectConfig,
) -> Result<()> {
    namer_core::db::save_project_config(layout, config)
}

/// Resolve the DB path and open a ProjectDb (delegates to core helper).
pub fn open_project_db(
    layout: &namer_core::db::ProjectLayout,
) -> Result<(namer_core::db::ProjectConfig, std::path::PathBuf, namer_core::db::ProjectDb)> {
    namer_core::db::open_project_db(layout)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
