//! Snapshot model (IR) for binaries, functions, instructions, and variables.
//!
//! A snapshot is the serialized view of one binary as exported from a
//! disassembler: every discovered function with its address, current name,
//! direct callees, decompiled instruction text, and per-instruction variable
//! references. Importing a snapshot populates the project database; the
//! database is the mutable side (names change there, the snapshot does not).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name prefixes a disassembler assigns to functions it could not name.
///
/// Functions still carrying one of these prefixes are fair game for batch
/// renaming; anything else is assumed to be human-chosen and left alone.
pub const AUTO_NAME_PREFIXES: &[&str] = &["sub_", "func_"];

/// Returns true if `name` still looks auto-generated (e.g., `sub_401000`).
pub fn is_auto_named(name: &str) -> bool {
    AUTO_NAME_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Error type for snapshot validation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot names no binary.
    #[error("snapshot 'binary' is required")]
    MissingBinary,

    /// Two functions share the same address.
    #[error("duplicate function address {0:#x}")]
    DuplicateFunction(u64),

    /// An instruction references a variable id the function never declares.
    #[error("function {function:#x} references undeclared variable id {var_id}")]
    UndeclaredVariable { function: u64, var_id: i64 },
}

/// One binary's worth of analysis data, as exported from a disassembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name of the binary this snapshot was taken from.
    pub binary: String,
    /// Optional architecture string (e.g., "armv7", "x86_64").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Every function discovered in the binary.
    pub functions: Vec<FunctionImage>,
}

/// A function as captured in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionImage {
    /// Entry address; the function's identity.
    pub address: u64,
    /// Current display name.
    pub name: String,
    /// Addresses of functions this one calls directly.
    #[serde(default)]
    pub callees: Vec<u64>,
    /// Variables scoped to this function. Identity is the id, never the name.
    #[serde(default)]
    pub variables: Vec<VariableImage>,
    /// Decompiled instruction sequence; may be empty when decompilation
    /// was unavailable for this function.
    #[serde(default)]
    pub instructions: Vec<InstructionImage>,
}

/// A variable scoped to one function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableImage {
    pub id: i64,
    pub name: String,
}

/// One decompiled instruction: its address, textual representation, and the
/// ids of the variables it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionImage {
    pub address: u64,
    pub text: String,
    #[serde(default)]
    pub vars: Vec<i64>,
}

impl Snapshot {
    /// Check internal consistency before the snapshot is allowed anywhere
    /// near the database.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.binary.trim().is_empty() {
            return Err(SnapshotError::MissingBinary);
        }

        let mut seen = std::collections::HashSet::new();
        for function in &self.functions {
            if !seen.insert(function.address) {
                return Err(SnapshotError::DuplicateFunction(function.address));
            }

            let declared: std::collections::HashSet<i64> =
                function.variables.iter().map(|v| v.id).collect();
            for instruction in &function.instructions {
                for var_id in &instruction.vars {
                    if !declared.contains(var_id) {
                        return Err(SnapshotError::UndeclaredVariable {
                            function: function.address,
                            var_id: *var_id,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
