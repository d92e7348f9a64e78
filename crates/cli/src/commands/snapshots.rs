use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{canonicalize_or_current, sha256_file};
use namer_core::db::{ProjectContext, SnapshotRecord};
use namer_core::model::Snapshot;

/// Import an analysis snapshot (JSON or YAML) into the project database.
///
/// A project tracks one binary at a time; re-importing replaces the previous
/// analysis data and clears the undo log.
pub fn import_snapshot_command(
    root: &str,
    file: &str,
    name: Option<String>,
    skip_hash: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let mut ctx = ProjectContext::from_root(&root_path)?;

    // Load snapshot (supports YAML or JSON based on extension).
    let snapshot_path = Path::new(file);
    let snapshot_bytes = fs::read(snapshot_path)
        .with_context(|| format!("Failed to read snapshot at {}", snapshot_path.display()))?;
    let snapshot: Snapshot = if snapshot_path.extension().and_then(|e| e.to_str()) == Some("json")
    {
        serde_json::from_slice(&snapshot_bytes).context("Failed to parse snapshot JSON")?
    } else {
        serde_yaml::from_slice(&snapshot_bytes).context("Failed to parse snapshot YAML")?
    };
    snapshot.validate().context("Snapshot failed validation")?;

    let hash = if skip_hash { None } else { Some(sha256_file(snapshot_path)?) };

    // Store path relative to project root when possible.
    let path_str = snapshot_path
        .canonicalize()
        .ok()
        .and_then(|abs| {
            root_path
                .canonicalize()
                .ok()
                .and_then(|root| abs.strip_prefix(&root).ok().map(|p| p.to_path_buf()))
        })
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());

    let record = SnapshotRecord {
        name: name.unwrap_or_else(|| snapshot.binary.clone()),
        path: path_str,
        hash,
        imported_at: Utc::now().to_rfc3339(),
    };

    let summary =
        ctx.db.import_snapshot(&snapshot, &record).context("Failed to import snapshot")?;

    println!("Imported snapshot:");
    println!("  Binary: {}", record.name);
    println!("  Functions: {}", summary.functions);
    println!("  Call edges: {}", summary.call_edges);
    println!("  Variables: {}", summary.variables);
    println!("  Instructions: {}", summary.instructions);
    if summary.dropped_edges > 0 {
        println!("  Dropped edges (callee outside snapshot): {}", summary.dropped_edges);
    }

    Ok(())
}
