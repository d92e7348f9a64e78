use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{canonicalize_or_current, parse_address};
use namer_core::db::ProjectContext;
use namer_core::oracle::OllamaClient;
use namer_core::tasks::{RenameRunner, RenameScope, TaskControl, TaskReport};

/// Rename every auto-named function, callees before callers.
pub fn rename_all_command(root: &str) -> Result<()> {
    run_rename(root, RenameScope::AllFunctions)
}

/// Rename one function regardless of its current name.
pub fn rename_function_command(root: &str, address: &str) -> Result<()> {
    run_rename(root, RenameScope::Function(parse_address(address)?))
}

/// Rename all variables referenced by one function.
pub fn rename_function_variables_command(root: &str, address: &str) -> Result<()> {
    run_rename(root, RenameScope::FunctionVariables(parse_address(address)?))
}

/// Rename the variables referenced by the instruction at an address.
pub fn rename_variable_command(root: &str, address: &str) -> Result<()> {
    run_rename(root, RenameScope::Variable { instruction: parse_address(address)? })
}

/// Shared driver: open the project, build the oracle client from config,
/// run the task, print the outcome, and write a report file.
fn run_rename(root: &str, scope: RenameScope) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let oracle = OllamaClient::from_settings(&ctx.config.oracle)
        .context("Run `set-server` and `set-model` before renaming")?;

    let control = TaskControl::new();
    let runner = RenameRunner { db: &ctx.db, oracle: &oracle };
    let report = runner
        .run(&scope, &control)
        .with_context(|| format!("Rename task failed for {}", scope.describe()))?;

    print_report(&report);
    let report_path = write_report(&ctx, &report)?;
    println!("  Report: {}", report_path.display());

    Ok(())
}

fn print_report(report: &TaskReport) {
    println!("Rename task: {} ({})", report.kind, report.scope);
    for event in &report.renamed {
        println!("  Renamed {} to {}", event.old_name, event.new_name);
    }
    for name in &report.no_suggestion {
        println!("  No proper name identified for {}", name);
    }
    for failure in &report.failures {
        println!("  Failed for {}: {}", failure.target, failure.error);
    }
    println!(
        "  Status: {} ({} renamed, {} without suggestion, {} failed)",
        report.status.as_str(),
        report.renamed.len(),
        report.no_suggestion.len(),
        report.failures.len()
    );
    match report.undo_step {
        Some(step) => println!("  Undo step: {} (revert with `undo`)", step),
        None => println!("  Undo step: (none; nothing was renamed)"),
    }
}

/// Persist the task report as JSON under `reports/`.
fn write_report(ctx: &ProjectContext, report: &TaskReport) -> Result<std::path::PathBuf> {
    fs::create_dir_all(&ctx.layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir {}", ctx.layout.reports_dir.display())
    })?;

    let file_name = format!("{}-{}.json", report.kind, Utc::now().format("%Y%m%d-%H%M%S"));
    let report_path = ctx.layout.reports_dir.join(file_name);
    let json = serde_json::to_string_pretty(report).context("Failed to serialize task report")?;
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write task report at {}", report_path.display()))?;

    Ok(report_path)
}
