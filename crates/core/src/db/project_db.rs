use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::{
    FunctionRow, ImportSummary, RenameRunRecord, RenameRunStatus, SnapshotRecord, UndoStepRecord,
    UndoSummary, VariableRow,
};
use crate::model::Snapshot;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A rename targeted a function address the database does not know.
    #[error("No function at address {0:#x}")]
    MissingFunction(u64),

    /// A rename targeted a variable the database does not know.
    #[error("No variable {var_id} in function {function:#x}")]
    MissingVariable { function: u64, var_id: i64 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed project database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for querying and updating records.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replace the analysis tables with the contents of a snapshot.
    ///
    /// A project tracks one binary at a time; re-importing wipes the previous
    /// functions, variables, instructions, and call edges. The undo log is
    /// cleared as well since its entries would point at stale entities. Run
    /// history is kept.
    pub fn import_snapshot(
        &mut self,
        snapshot: &Snapshot,
        record: &SnapshotRecord,
    ) -> DbResult<ImportSummary> {
        let known: std::collections::HashSet<u64> =
            snapshot.functions.iter().map(|f| f.address).collect();

        let mut summary = ImportSummary::default();
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            r#"
            DELETE FROM instruction_vars;
            DELETE FROM instructions;
            DELETE FROM variables;
            DELETE FROM call_edges;
            DELETE FROM functions;
            DELETE FROM undo_entries;
            DELETE FROM undo_steps;
            "#,
        )?;

        for function in &snapshot.functions {
            tx.execute(
                "INSERT INTO functions (address, name) VALUES (?1, ?2)",
                params![function.address as i64, function.name],
            )?;
            summary.functions += 1;

            for callee in &function.callees {
                if !known.contains(callee) {
                    summary.dropped_edges += 1;
                    continue;
                }
                tx.execute(
                    "INSERT INTO call_edges (caller, callee) VALUES (?1, ?2)",
                    params![function.address as i64, *callee as i64],
                )?;
                summary.call_edges += 1;
            }

            for variable in &function.variables {
                tx.execute(
                    "INSERT INTO variables (function_address, var_id, name) VALUES (?1, ?2, ?3)",
                    params![function.address as i64, variable.id, variable.name],
                )?;
                summary.variables += 1;
            }

            for (seq, instruction) in function.instructions.iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO instructions (function_address, seq, address, text)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![
                        function.address as i64,
                        seq as i64,
                        instruction.address as i64,
                        instruction.text
                    ],
                )?;
                summary.instructions += 1;

                for var_id in &instruction.vars {
                    tx.execute(
                        r#"
                        INSERT INTO instruction_vars (function_address, seq, var_id)
                        VALUES (?1, ?2, ?3)
                        "#,
                        params![function.address as i64, seq as i64, *var_id],
                    )?;
                }
            }
        }

        tx.execute(
            "INSERT INTO snapshots (name, path, hash, imported_at) VALUES (?1, ?2, ?3, ?4)",
            params![record.name, record.path, record.hash, record.imported_at],
        )?;

        tx.commit()?;

        if summary.dropped_edges > 0 {
            tracing::warn!(
                dropped = summary.dropped_edges,
                "dropped call edges to functions outside the snapshot"
            );
        }

        Ok(summary)
    }

    /// The most recently imported snapshot, if any.
    pub fn latest_snapshot(&self) -> DbResult<Option<SnapshotRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT name, path, hash, imported_at
                FROM snapshots
                ORDER BY id DESC
                LIMIT 1
                "#,
                [],
                |row| {
                    Ok(SnapshotRecord {
                        name: row.get(0)?,
                        path: row.get(1)?,
                        hash: row.get(2)?,
                        imported_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// List all functions (ordered by address).
    pub fn list_functions(&self) -> DbResult<Vec<FunctionRow>> {
        let mut stmt =
            self.conn.prepare("SELECT address, name FROM functions ORDER BY address")?;
        let rows = stmt.query_map([], |row| {
            Ok(FunctionRow { address: row.get::<_, i64>(0)? as u64, name: row.get(1)? })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Look up one function by address.
    pub fn function(&self, address: u64) -> DbResult<Option<FunctionRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT address, name FROM functions WHERE address = ?1",
                params![address as i64],
                |row| {
                    Ok(FunctionRow { address: row.get::<_, i64>(0)? as u64, name: row.get(1)? })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// All caller -> callee pairs, in import order.
    pub fn call_edges(&self) -> DbResult<Vec<(u64, u64)>> {
        let mut stmt = self.conn.prepare("SELECT caller, callee FROM call_edges ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// The decompiled text of a function: per-instruction representations
    /// joined by newlines. `None` when no decompilation was imported.
    pub fn function_text(&self, address: u64) -> DbResult<Option<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT text FROM instructions WHERE function_address = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![address as i64], |row| row.get::<_, String>(0))?;

        let mut lines = Vec::new();
        for row in rows {
            lines.push(row?);
        }
        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(lines.join("\n")))
        }
    }

    /// Variables referenced across all of a function's instructions,
    /// de-duplicated by id in first-use order.
    pub fn function_variables(&self, address: u64) -> DbResult<Vec<VariableRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT iv.var_id, v.name
            FROM instruction_vars iv
            JOIN variables v
              ON v.function_address = iv.function_address AND v.var_id = iv.var_id
            WHERE iv.function_address = ?1
            ORDER BY iv.seq, iv.id
            "#,
        )?;
        let rows = stmt.query_map(params![address as i64], |row| {
            Ok(VariableRow { var_id: row.get(0)?, name: row.get(1)? })
        })?;

        collect_unique_vars(rows)
    }

    /// Variables referenced by the instruction(s) at `address` within one
    /// function, de-duplicated by id in first-use order.
    pub fn instruction_variables(
        &self,
        function: u64,
        address: u64,
    ) -> DbResult<Vec<VariableRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT iv.var_id, v.name
            FROM instructions i
            JOIN instruction_vars iv
              ON iv.function_address = i.function_address AND iv.seq = i.seq
            JOIN variables v
              ON v.function_address = iv.function_address AND v.var_id = iv.var_id
            WHERE i.function_address = ?1 AND i.address = ?2
            ORDER BY i.seq, iv.id
            "#,
        )?;
        let rows = stmt.query_map(params![function as i64, address as i64], |row| {
            Ok(VariableRow { var_id: row.get(0)?, name: row.get(1)? })
        })?;

        collect_unique_vars(rows)
    }

    /// Look up one variable by identity.
    pub fn variable(&self, function: u64, var_id: i64) -> DbResult<Option<VariableRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT var_id, name FROM variables WHERE function_address = ?1 AND var_id = ?2",
                params![function as i64, var_id],
                |row| Ok(VariableRow { var_id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?;
        Ok(row)
    }

    /// Addresses of functions containing an instruction at `address`.
    pub fn functions_containing(&self, address: u64) -> DbResult<Vec<u64>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT function_address
            FROM instructions
            WHERE address = ?1
            ORDER BY function_address
            "#,
        )?;
        let rows = stmt.query_map(params![address as i64], |row| row.get::<_, i64>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row? as u64);
        }
        Ok(out)
    }

    /// Open a new undo step. Renames performed with the returned id are
    /// grouped into one reversible unit.
    pub fn begin_undo_step(&self, description: &str) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO undo_steps (description, created_at, committed) VALUES (?1, ?2, 0)",
            params![description, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Commit an undo step. An empty step (no renames happened) is discarded
    /// instead; returns whether the step was kept.
    pub fn commit_undo_step(&self, step_id: i64) -> DbResult<bool> {
        let entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM undo_entries WHERE step_id = ?1",
            params![step_id],
            |row| row.get(0),
        )?;
        if entries == 0 {
            self.conn.execute("DELETE FROM undo_steps WHERE id = ?1", params![step_id])?;
            return Ok(false);
        }
        self.conn
            .execute("UPDATE undo_steps SET committed = 1 WHERE id = ?1", params![step_id])?;
        Ok(true)
    }

    /// Rename a function inside an undo step, recording the old name.
    pub fn rename_function(&self, step_id: i64, address: u64, new_name: &str) -> DbResult<()> {
        let old: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM functions WHERE address = ?1",
                params![address as i64],
                |row| row.get(0),
            )
            .optional()?;
        let old = old.ok_or(DbError::MissingFunction(address))?;

        self.conn.execute(
            "UPDATE functions SET name = ?2 WHERE address = ?1",
            params![address as i64, new_name],
        )?;
        self.conn.execute(
            r#"
            INSERT INTO undo_entries (step_id, kind, function_address, var_id, old_name, new_name)
            VALUES (?1, 'function', ?2, NULL, ?3, ?4)
            "#,
            params![step_id, address as i64, old, new_name],
        )?;
        Ok(())
    }

    /// Rename a variable inside an undo step, recording the old name.
    pub fn rename_variable(
        &self,
        step_id: i64,
        function: u64,
        var_id: i64,
        new_name: &str,
    ) -> DbResult<()> {
        let old: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM variables WHERE function_address = ?1 AND var_id = ?2",
                params![function as i64, var_id],
                |row| row.get(0),
            )
            .optional()?;
        let old = old.ok_or(DbError::MissingVariable { function, var_id })?;

        self.conn.execute(
            "UPDATE variables SET name = ?3 WHERE function_address = ?1 AND var_id = ?2",
            params![function as i64, var_id, new_name],
        )?;
        self.conn.execute(
            r#"
            INSERT INTO undo_entries (step_id, kind, function_address, var_id, old_name, new_name)
            VALUES (?1, 'variable', ?2, ?3, ?4, ?5)
            "#,
            params![step_id, function as i64, var_id, old, new_name],
        )?;
        Ok(())
    }

    /// List committed undo steps (oldest first).
    pub fn list_undo_steps(&self) -> DbResult<Vec<UndoStepRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.description, s.created_at,
                   (SELECT COUNT(*) FROM undo_entries e WHERE e.step_id = s.id)
            FROM undo_steps s
            WHERE s.committed = 1
            ORDER BY s.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(UndoStepRecord {
                id: row.get(0)?,
                description: row.get(1)?,
                created_at: row.get(2)?,
                entries: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Revert the most recent committed undo step: restore every old name it
    /// recorded, newest entry first, then drop the step.
    pub fn undo_last(&mut self) -> DbResult<Option<UndoSummary>> {
        let tx = self.conn.transaction()?;

        let step: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, description FROM undo_steps WHERE committed = 1 ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((step_id, description)) = step else {
            return Ok(None);
        };

        let entries: Vec<(String, i64, Option<i64>, String)> = {
            let mut stmt = tx.prepare(
                r#"
                SELECT kind, function_address, var_id, old_name
                FROM undo_entries
                WHERE step_id = ?1
                ORDER BY id DESC
                "#,
            )?;
            let rows = stmt.query_map(params![step_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            out
        };

        for (kind, function_address, var_id, old_name) in &entries {
            match kind.as_str() {
                "function" => {
                    tx.execute(
                        "UPDATE functions SET name = ?2 WHERE address = ?1",
                        params![function_address, old_name],
                    )?;
                }
                _ => {
                    tx.execute(
                        "UPDATE variables SET name = ?3 WHERE function_address = ?1 AND var_id = ?2",
                        params![function_address, var_id, old_name],
                    )?;
                }
            }
        }

        tx.execute("DELETE FROM undo_entries WHERE step_id = ?1", params![step_id])?;
        tx.execute("DELETE FROM undo_steps WHERE id = ?1", params![step_id])?;
        tx.commit()?;

        Ok(Some(UndoSummary { step_id, description, reverted: entries.len() }))
    }

    /// Insert a rename run record and return its row id.
    pub fn insert_rename_run(&self, record: &RenameRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO rename_runs
                (kind, scope, status, renamed, no_suggestion, failed, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.kind,
                record.scope,
                record.status.as_str(),
                record.renamed,
                record.no_suggestion,
                record.failed,
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List rename runs (ordered by id).
    pub fn list_rename_runs(&self) -> DbResult<Vec<RenameRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT kind, scope, status, renamed, no_suggestion, failed, started_at, finished_at
            FROM rename_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(2)?;
            Ok(RenameRunRecord {
                kind: row.get(0)?,
                scope: row.get(1)?,
                status: RenameRunStatus::from_str_lossy(&status),
                renamed: row.get(3)?,
                no_suggestion: row.get(4)?,
                failed: row.get(5)?,
                started_at: row.get(6)?,
                finished_at: row.get(7)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Drain a variable row iterator, keeping the first occurrence of each id.
fn collect_unique_vars(
    rows: impl Iterator<Item = rusqlite::Result<VariableRow>>,
) -> DbResult<Vec<VariableRow>> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        let var = row?;
        if seen.insert(var.var_id) {
            out.push(var);
        }
    }
    Ok(out)
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (snapshots, functions, call_edges, variables,
///   instructions, instruction_vars)
/// - 2: add rename_runs and the undo log (undo_steps, undo_entries)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        // Initial schema.
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS snapshots (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                path        TEXT NOT NULL,
                hash        TEXT,
                imported_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS functions (
                address INTEGER PRIMARY KEY,
                name    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS call_edges (
                id     INTEGER PRIMARY KEY AUTOINCREMENT,
                caller INTEGER NOT NULL,
                callee INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS variables (
                function_address INTEGER NOT NULL,
                var_id           INTEGER NOT NULL,
                name             TEXT NOT NULL,
                PRIMARY KEY (function_address, var_id)
            );

            CREATE TABLE IF NOT EXISTS instructions (
                function_address INTEGER NOT NULL,
                seq              INTEGER NOT NULL,
                address          INTEGER NOT NULL,
                text             TEXT NOT NULL,
                PRIMARY KEY (function_address, seq)
            );

            CREATE TABLE IF NOT EXISTS instruction_vars (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                function_address INTEGER NOT NULL,
                seq              INTEGER NOT NULL,
                var_id           INTEGER NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS rename_runs (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                kind          TEXT NOT NULL,
                scope         TEXT NOT NULL,
                status        TEXT NOT NULL,
                renamed       INTEGER NOT NULL,
                no_suggestion INTEGER NOT NULL,
                failed        INTEGER NOT NULL,
                started_at    TEXT NOT NULL,
                finished_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS undo_steps (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                committed   INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS undo_entries (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                step_id          INTEGER NOT NULL,
                kind             TEXT NOT NULL,
                function_address INTEGER NOT NULL,
                var_id           INTEGER,
                old_name         TEXT NOT NULL,
                new_name         TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
