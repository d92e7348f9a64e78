use anyhow::Result;

use crate::canonicalize_or_current;
use namer_core::analysis::bottom_up_order;
use namer_core::db::ProjectContext;
use namer_core::model::is_auto_named;

/// List all functions in the project database.
pub fn list_functions_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let functions = ctx.db.list_functions()?;

    if json {
        let serialized = serde_json::to_string_pretty(&functions)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Functions ({}):", functions.len());
    if functions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for function in functions {
        let marker = if is_auto_named(&function.name) { " [auto]" } else { "" };
        println!("  - {:#x} {}{}", function.address, function.name, marker);
    }

    Ok(())
}

/// Print the bottom-up (callees before callers) traversal order.
pub fn show_order_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let functions = ctx.db.list_functions()?;
    let edges = ctx.db.call_edges()?;
    let names: std::collections::HashMap<u64, String> =
        functions.iter().map(|f| (f.address, f.name.clone())).collect();

    let order = bottom_up_order(functions.iter().map(|f| f.address), edges);

    if json {
        let entries: Vec<serde_json::Value> = order
            .iter()
            .map(|address| {
                serde_json::json!({
                    "address": address,
                    "name": names.get(address),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Bottom-up order ({} functions):", order.len());
    for (position, address) in order.iter().enumerate() {
        let name = names.get(address).map(String::as_str).unwrap_or("?");
        println!("  {}. {} @ {:#x}", position + 1, name, address);
    }

    Ok(())
}
