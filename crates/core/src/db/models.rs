use serde::{Deserialize, Serialize};

/// A function row as stored in the project database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionRow {
    /// Entry address; the function's identity.
    pub address: u64,
    /// Current display name.
    pub name: String,
}

/// A variable row: identity is `(function_address, var_id)`, never the name.
/// Several variables may share a name before renaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableRow {
    pub var_id: i64,
    pub name: String,
}

/// Record describing an imported snapshot, for provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Name of the binary the snapshot was taken from.
    pub name: String,
    /// Path of the snapshot file, relative to the project root if possible.
    pub path: String,
    /// Optional content hash of the snapshot file (SHA-256).
    pub hash: Option<String>,
    /// RFC3339 timestamp of the import.
    pub imported_at: String,
}

/// Counts produced by a snapshot import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub functions: usize,
    pub variables: usize,
    pub instructions: usize,
    pub call_edges: usize,
    /// Edges whose callee was not part of the function collection (calls
    /// into imports, thunks the exporter dropped, etc.).
    pub dropped_edges: usize,
}

/// Final status of a rename run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenameRunStatus {
    Completed,
    Cancelled,
    Failed,
}

impl RenameRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameRunStatus::Completed => "completed",
            RenameRunStatus::Cancelled => "cancelled",
            RenameRunStatus::Failed => "failed",
        }
    }

    /// Decode from the string stored in SQLite. Unknown values are read back
    /// as `Failed` rather than rejected.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "completed" => RenameRunStatus::Completed,
            "cancelled" => RenameRunStatus::Cancelled,
            _ => RenameRunStatus::Failed,
        }
    }
}

/// Record describing one executed rename task, for bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameRunRecord {
    /// Task kind (e.g., "rename-all-functions").
    pub kind: String,
    /// Human-readable scope (e.g., "function 0x401000").
    pub scope: String,
    pub status: RenameRunStatus,
    pub renamed: i64,
    pub no_suggestion: i64,
    pub failed: i64,
    pub started_at: String,
    pub finished_at: String,
}

/// One committed undo step (the renames of one task).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UndoStepRecord {
    pub id: i64,
    pub description: String,
    pub created_at: String,
    pub entries: i64,
}

/// Result of reverting an undo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSummary {
    pub step_id: i64,
    pub description: String,
    pub reverted: usize,
}
