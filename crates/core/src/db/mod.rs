//! Project database integration and project layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - The imported analysis snapshot (functions, call edges, variables,
//!   decompiled instruction text).
//! - The undo log: renames grouped into steps so one rename task is one
//!   reversible unit.
//! - Rename run history for bookkeeping.
//!
//! It also defines:
//! - `DbConfig` / `ProjectConfig`: serializable project metadata.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectContext`: layout + config + open database bundle.

pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod project_db;
pub mod util;

pub use config::*;
pub use context::*;
pub use layout::*;
pub use models::*;
pub use project_db::*;
pub use util::*;
