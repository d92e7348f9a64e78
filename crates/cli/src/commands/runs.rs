use anyhow::Result;

use crate::canonicalize_or_current;
use namer_core::db::ProjectContext;

/// List rename runs recorded in the project database.
pub fn list_runs_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let runs = ctx.db.list_rename_runs()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    println!("Rename runs ({}):", runs.len());
    if runs.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for run in runs {
        println!(
            "  - {} [{}] {} ({} renamed, {} without suggestion, {} failed) at {}",
            run.kind,
            run.status.as_str(),
            run.scope,
            run.renamed,
            run.no_suggestion,
            run.failed,
            run.started_at
        );
    }

    Ok(())
}

/// Revert the most recent rename task (one undo step).
pub fn undo_command(root: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let mut ctx = ProjectContext::from_root(&root_path)?;

    match ctx.db.undo_last()? {
        Some(summary) => {
            println!(
                "Reverted undo step {} ({}): {} names restored",
                summary.step_id, summary.description, summary.reverted
            );
        }
        None => println!("Nothing to undo."),
    }

    Ok(())
}
