//! Rename task orchestration.
//!
//! Four task variants share one execution skeleton; they differ only in how
//! their work items are resolved. A task walks its items, asks the naming
//! oracle for a suggestion per item, validates and de-duplicates the answer,
//! and applies accepted names through the project database inside a single
//! undo step. Tasks are cooperatively cancellable between items and report
//! progress as human-readable strings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::bottom_up_order;
use crate::db::{DbError, ProjectDb, RenameRunRecord, RenameRunStatus};
use crate::model::is_auto_named;
use crate::oracle::NamingOracle;

/// What a rename task operates on.
///
/// The variants share the full execution skeleton below; only
/// `resolve_items` branches on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameScope {
    /// Every auto-named function with decompiled text, visited bottom-up so
    /// callees are renamed before their callers.
    AllFunctions,
    /// Exactly one function, renamed regardless of its current name.
    Function(u64),
    /// All variables referenced across one function's instructions.
    FunctionVariables(u64),
    /// The variables referenced by the instruction at this address; the
    /// enclosing function is looked up from the address.
    Variable { instruction: u64 },
}

impl RenameScope {
    /// Stable task-kind string, used for run records and report file names.
    pub fn kind(&self) -> &'static str {
        match self {
            RenameScope::AllFunctions => "rename-all-functions",
            RenameScope::Function(_) => "rename-function",
            RenameScope::FunctionVariables(_) => "rename-function-variables",
            RenameScope::Variable { .. } => "rename-variable",
        }
    }

    /// Human-readable scope description, used for undo step descriptions.
    pub fn describe(&self) -> String {
        match self {
            RenameScope::AllFunctions => "all functions".to_string(),
            RenameScope::Function(address) => format!("function {address:#x}"),
            RenameScope::FunctionVariables(address) => {
                format!("variables of function {address:#x}")
            }
            RenameScope::Variable { instruction } => {
                format!("variable at instruction {instruction:#x}")
            }
        }
    }

    /// Whether suggestions in this scope go through the collision counter.
    /// Single-entity scopes commit whatever the oracle says; batch scopes
    /// must not commit the same name twice.
    fn uses_name_counter(&self) -> bool {
        matches!(self, RenameScope::AllFunctions | RenameScope::FunctionVariables(_))
    }
}

/// Error type for rename task execution.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("No function at address {0:#x}")]
    UnknownFunction(u64),

    #[error("No function contains an instruction at {0:#x}")]
    UnknownInstruction(u64),

    #[error("Function {0:#x} has no decompiled instructions")]
    MissingDecompilation(u64),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Rename worker thread panicked")]
    Worker,
}

/// Task-local collision counter for proposed names.
///
/// The first use of a name commits unsuffixed; the second occurrence becomes
/// `name_2`, the third `name_3`, tracking the running count for the raw
/// candidate.
#[derive(Debug, Default)]
pub struct NameCounter {
    counts: HashMap<String, u32>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `candidate` and return the name to actually commit.
    pub fn disambiguate(&mut self, candidate: String) -> String {
        match self.counts.get_mut(&candidate) {
            Some(count) => {
                *count += 1;
                format!("{candidate}_{count}")
            }
            None => {
                self.counts.insert(candidate.clone(), 1);
                candidate
            }
        }
    }
}

/// Shared cancellation flag and progress string for one task.
///
/// The flag is checked between work items, never mid-item; the oracle round
/// trip is the only blocking point inside an item.
#[derive(Debug, Default)]
pub struct TaskControl {
    cancelled: AtomicBool,
    progress: Mutex<String>,
}

impl TaskControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative cancellation; the task stops before its next item.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Latest progress message.
    pub fn progress(&self) -> String {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn set_progress(&self, message: String) {
        tracing::info!("{message}");
        if let Ok(mut progress) = self.progress.lock() {
            *progress = message;
        }
    }
}

/// One committed rename.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenameEvent {
    pub target: String,
    pub old_name: String,
    pub new_name: String,
}

/// One item the oracle could not be reached for.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemFailure {
    pub target: String,
    pub error: String,
}

/// Outcome of one rename task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub kind: String,
    pub scope: String,
    pub status: RenameRunStatus,
    pub renamed: Vec<RenameEvent>,
    pub no_suggestion: Vec<String>,
    pub failures: Vec<ItemFailure>,
    /// Id of the undo step covering this task's renames; `None` when the
    /// task renamed nothing (empty steps are discarded).
    pub undo_step: Option<i64>,
    pub started_at: String,
    pub finished_at: String,
}

/// What a single work item renames.
enum WorkTarget {
    Function { address: u64 },
    Variable { function: u64, var_id: i64 },
}

struct WorkItem {
    /// Function whose decompiled text goes to the oracle.
    function: u64,
    /// Current display name of the entity being renamed.
    current_name: String,
    /// Label for progress and failure messages.
    label: String,
    target: WorkTarget,
}

/// Coordinator that ties the project database and a naming oracle together
/// to execute one rename task.
pub struct RenameRunner<'a> {
    pub db: &'a ProjectDb,
    pub oracle: &'a dyn NamingOracle,
}

impl<'a> RenameRunner<'a> {
    /// Execute a rename task synchronously.
    ///
    /// All accepted names are applied inside one undo step. Per-item oracle
    /// failures are recorded and the batch continues; database failures abort
    /// the task. A cancelled task keeps the renames made so far as a single
    /// committed step.
    pub fn run(
        &self,
        scope: &RenameScope,
        control: &TaskControl,
    ) -> Result<TaskReport, TaskError> {
        let started_at = Utc::now().to_rfc3339();
        control.set_progress("Starting renaming task...".to_string());

        let items = self.resolve_items(scope)?;
        let step_id = self.db.begin_undo_step(&format!("Rename {}", scope.describe()))?;

        let mut counter = NameCounter::new();
        let mut text_cache: HashMap<u64, Option<String>> = HashMap::new();
        let mut renamed = Vec::new();
        let mut no_suggestion = Vec::new();
        let mut failures = Vec::new();
        let mut cancelled = false;

        for item in items {
            if control.is_cancelled() {
                cancelled = true;
                break;
            }

            let text = match text_cache.get(&item.function) {
                Some(text) => text.clone(),
                None => {
                    let text = self.db.function_text(item.function)?;
                    text_cache.insert(item.function, text.clone());
                    text
                }
            };
            // Functions without decompilation are skipped silently in batch
            // scopes; single-function scopes reject them during resolution.
            let Some(text) = text else {
                continue;
            };

            let suggestion = match &item.target {
                WorkTarget::Function { .. } => self.oracle.function_name(&text),
                WorkTarget::Variable { .. } => {
                    self.oracle.variable_name(&item.current_name, &text)
                }
            };

            match suggestion {
                Ok(raw) => match sanitize_candidate(&raw) {
                    Some(candidate) => {
                        let new_name = if scope.uses_name_counter() {
                            counter.disambiguate(candidate)
                        } else {
                            candidate
                        };
                        match &item.target {
                            WorkTarget::Function { address } => {
                                self.db.rename_function(step_id, *address, &new_name)?;
                            }
                            WorkTarget::Variable { function, var_id } => {
                                self.db.rename_variable(step_id, *function, *var_id, &new_name)?;
                            }
                        }
                        control.set_progress(format!(
                            "Renamed {} to {}",
                            item.current_name, new_name
                        ));
                        renamed.push(RenameEvent {
                            target: item.label,
                            old_name: item.current_name,
                            new_name,
                        });
                    }
                    None => {
                        control.set_progress(format!(
                            "{} didn't identify a proper name for {}",
                            self.oracle.name(),
                            item.current_name
                        ));
                        no_suggestion.push(item.current_name);
                    }
                },
                Err(err) => {
                    control.set_progress(format!(
                        "Oracle request failed for {}: {err}",
                        item.label
                    ));
                    failures.push(ItemFailure { target: item.label, error: err.to_string() });
                }
            }
        }

        let kept = self.db.commit_undo_step(step_id)?;
        let status =
            if cancelled { RenameRunStatus::Cancelled } else { RenameRunStatus::Completed };
        let finished_at = Utc::now().to_rfc3339();

        self.db.insert_rename_run(&RenameRunRecord {
            kind: scope.kind().to_string(),
            scope: scope.describe(),
            status,
            renamed: renamed.len() as i64,
            no_suggestion: no_suggestion.len() as i64,
            failed: failures.len() as i64,
            started_at: started_at.clone(),
            finished_at: finished_at.clone(),
        })?;

        Ok(TaskReport {
            kind: scope.kind().to_string(),
            scope: scope.describe(),
            status,
            renamed,
            no_suggestion,
            failures,
            undo_step: if kept { Some(step_id) } else { None },
            started_at,
            finished_at,
        })
    }

    /// Turn a scope into concrete work items.
    fn resolve_items(&self, scope: &RenameScope) -> Result<Vec<WorkItem>, TaskError> {
        match scope {
            RenameScope::AllFunctions => {
                let functions = self.db.list_functions()?;
                let edges = self.db.call_edges()?;
                let names: HashMap<u64, String> =
                    functions.iter().map(|f| (f.address, f.name.clone())).collect();

                let order = bottom_up_order(functions.iter().map(|f| f.address), edges);
                let items = order
                    .into_iter()
                    .filter_map(|address| {
                        let name = names.get(&address)?;
                        if !is_auto_named(name) {
                            return None;
                        }
                        Some(WorkItem {
                            function: address,
                            current_name: name.clone(),
                            label: format!("function {name}"),
                            target: WorkTarget::Function { address },
                        })
                    })
                    .collect();
                Ok(items)
            }
            RenameScope::Function(address) => {
                let function = self
                    .db
                    .function(*address)?
                    .ok_or(TaskError::UnknownFunction(*address))?;
                if self.db.function_text(*address)?.is_none() {
                    return Err(TaskError::MissingDecompilation(*address));
                }
                Ok(vec![WorkItem {
                    function: *address,
                    label: format!("function {}", function.name),
                    current_name: function.name,
                    target: WorkTarget::Function { address: *address },
                }])
            }
            RenameScope::FunctionVariables(address) => {
                if self.db.function(*address)?.is_none() {
                    return Err(TaskError::UnknownFunction(*address));
                }
                let vars = self.db.function_variables(*address)?;
                Ok(vars
                    .into_iter()
                    .map(|var| WorkItem {
                        function: *address,
                        label: format!("variable {}", var.name),
                        current_name: var.name,
                        target: WorkTarget::Variable { function: *address, var_id: var.var_id },
                    })
                    .collect())
            }
            RenameScope::Variable { instruction } => {
                let containing = self.db.functions_containing(*instruction)?;
                let function = *containing
                    .first()
                    .ok_or(TaskError::UnknownInstruction(*instruction))?;
                let vars = self.db.instruction_variables(function, *instruction)?;
                Ok(vars
                    .into_iter()
                    .map(|var| WorkItem {
                        function,
                        label: format!("variable {}", var.name),
                        current_name: var.name,
                        target: WorkTarget::Variable { function, var_id: var.var_id },
                    })
                    .collect())
            }
        }
    }
}

/// Validate a raw oracle suggestion: trimmed, non-empty, single word.
/// Anything else means "no suggestion", not an error.
fn sanitize_candidate(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Handle to a rename task running on a background worker thread.
pub struct TaskHandle {
    control: Arc<TaskControl>,
    thread: JoinHandle<Result<TaskReport, TaskError>>,
}

impl TaskHandle {
    /// Shared control block, e.g. for a UI polling progress.
    pub fn control(&self) -> Arc<TaskControl> {
        Arc::clone(&self.control)
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Latest progress message.
    pub fn progress(&self) -> String {
        self.control.progress()
    }

    /// Wait for the task to finish and return its report.
    pub fn join(self) -> Result<TaskReport, TaskError> {
        self.thread.join().map_err(|_| TaskError::Worker)?
    }
}

/// Run a rename task on its own background thread so callers stay
/// responsive. The database is moved into the worker; callers are expected
/// to serialize tasks per project to keep undo steps from interleaving.
pub fn spawn(db: ProjectDb, oracle: Box<dyn NamingOracle>, scope: RenameScope) -> TaskHandle {
    let control = Arc::new(TaskControl::new());
    let worker_control = Arc::clone(&control);
    let thread = std::thread::spawn(move || {
        let runner = RenameRunner { db: &db, oracle: oracle.as_ref() };
        runner.run(&scope, &worker_control)
    });
    TaskHandle { control, thread }
}
