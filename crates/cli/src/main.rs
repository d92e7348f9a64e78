use anyhow::Result;
use clap::{Parser, Subcommand};

use binary_namer::commands::{
    import_snapshot_command, init_project_command, list_functions_command, list_models_command,
    list_runs_command, project_info_command, rename_all_command, rename_function_command,
    rename_function_variables_command, rename_variable_command, set_model_command,
    set_server_command, show_order_command, undo_command,
};

/// LLM-assisted renaming assistant CLI.
///
/// This CLI is a thin wrapper around `namer-core` (exposed in code as
/// `namer_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "binary-namer",
    version,
    about = "LLM-assisted renaming assistant for reverse-engineered binaries",
    long_about = None,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Binary Namer project at the given root.
    ///
    /// This will:
    /// - Create a `.namer` metadata directory and project database.
    /// - Create a `reports` directory.
    /// - Write a `.namer/project.json` config file.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing project.
    ///
    /// This reads `.namer/project.json` and reports config values, oracle
    /// settings, and database counts.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// Import an analysis snapshot (JSON or YAML) into the project database.
    ///
    /// Re-importing replaces previous analysis data and clears the undo log.
    Import {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the snapshot file.
        #[arg(long)]
        file: String,

        /// Optional snapshot name. Defaults to the binary name in the snapshot.
        #[arg(long)]
        name: Option<String>,

        /// Skip hash computation (stores no hash).
        #[arg(long, default_value_t = false)]
        skip_hash: bool,
    },

    /// List all functions in the project database.
    ListFunctions {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the bottom-up traversal order (callees before callers).
    ShowOrder {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Configure the naming-oracle server address.
    SetServer {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Server host (e.g., localhost or http://192.168.1.10).
        #[arg(long)]
        host: String,

        /// Server port (e.g., 11434).
        #[arg(long)]
        port: u16,
    },

    /// Select the model used for name suggestions.
    SetModel {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Model name as known to the server (e.g., mistral:latest).
        #[arg(long)]
        model: String,

        /// Optional context-length budget forwarded to the model.
        #[arg(long)]
        num_ctx: Option<u64>,
    },

    /// Query the oracle server for its installed models.
    ListModels {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Rename every auto-named function, callees before callers.
    RenameAll {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// Rename one function regardless of its current name.
    RenameFunction {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Function address (decimal or 0x-prefixed hex).
        #[arg(long)]
        address: String,
    },

    /// Rename all variables referenced by one function.
    RenameVariables {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Function address (decimal or 0x-prefixed hex).
        #[arg(long)]
        address: String,
    },

    /// Rename the variables referenced by the instruction at an address.
    RenameVariable {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Instruction address (decimal or 0x-prefixed hex).
        #[arg(long)]
        address: String,
    },

    /// List rename runs recorded in the project database.
    ListRuns {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Revert the most recent rename task (one undo step).
    Undo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root } => project_info_command(&root)?,
        Command::Import { root, file, name, skip_hash } => {
            import_snapshot_command(&root, &file, name, skip_hash)?
        }
        Command::ListFunctions { root, json } => list_functions_command(&root, json)?,
        Command::ShowOrder { root, json } => show_order_command(&root, json)?,
        Command::SetServer { root, host, port } => set_server_command(&root, &host, port)?,
        Command::SetModel { root, model, num_ctx } => set_model_command(&root, &model, num_ctx)?,
        Command::ListModels { root, json } => list_models_command(&root, json)?,
        Command::RenameAll { root } => rename_all_command(&root)?,
        Command::RenameFunction { root, address } => rename_function_command(&root, &address)?,
        Command::RenameVariables { root, address } => {
            rename_function_variables_command(&root, &address)?
        }
        Command::RenameVariable { root, address } => rename_variable_command(&root, &address)?,
        Command::ListRuns { root, json } => list_runs_command(&root, json)?,
        Command::Undo { root } => undo_command(&root)?,
    }

    Ok(())
}
