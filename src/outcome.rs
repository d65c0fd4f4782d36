//! Migrate-apply results and their classification (v0.1)
//!
//! - [`MigrateApply`]: structured result decoded from `atlas migrate apply --format '{{ json . }}'`
//! - [`ApplyOutcome`]: the three ways a call can end (ok / engine failed / call failed)

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ActionError, EngineError};

/// Action output keys
pub mod output {
    pub const ERROR: &str = "error";
    pub const CURRENT: &str = "current";
    pub const TARGET: &str = "target";
    pub const PENDING_COUNT: &str = "pending_count";
    pub const APPLIED_COUNT: &str = "applied_count";

    /// Keys written together on success
    pub const SUCCESS: [&str; 4] = [CURRENT, TARGET, PENDING_COUNT, APPLIED_COUNT];
}

// ═══════════════════════════════════════════
// ENGINE RESULT
// ═══════════════════════════════════════════

/// Environment the engine ran against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Env {
    pub driver: String,
    /// Parsed database URL, kept opaque
    #[serde(rename = "URL")]
    pub url: Option<Value>,
    pub dir: String,
}

/// A migration file in the directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MigrationFile {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Statement that failed inside an applied file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StmtError {
    pub stmt: String,
    pub text: String,
}

/// A migration file executed during this run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppliedFile {
    #[serde(flatten)]
    pub file: MigrationFile,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Statements skipped (partially applied file)
    pub skipped: usize,
    /// Statements executed
    pub applied: Vec<String>,
    pub error: Option<StmtError>,
}

/// Result of one `migrate apply` call. Sequences are in application order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MigrateApply {
    /// Embedded in the JSON: `Driver`, `URL` and `Dir` sit at the top level
    #[serde(flatten)]
    pub env: Env,
    pub pending: Vec<MigrationFile>,
    pub applied: Vec<AppliedFile>,
    pub current: String,
    pub target: String,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Non-empty when the engine reports that the apply failed
    pub error: String,
}

impl MigrateApply {
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_failed(&self) -> bool {
        !self.error.is_empty()
    }
}

impl fmt::Display for MigrateApply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = if self.current.is_empty() { "-" } else { &self.current };
        let target = if self.target.is_empty() { "-" } else { &self.target };
        write!(
            f,
            "{} -> {} ({} pending, {} applied)",
            current,
            target,
            self.pending_count(),
            self.applied_count()
        )?;
        if !self.applied.is_empty() {
            let versions: Vec<&str> = self
                .applied
                .iter()
                .map(|a| a.file.version.as_str())
                .collect();
            write!(f, " [{}]", versions.join(", "))?;
        }
        if !self.env.dir.is_empty() {
            write!(f, " dir={}", self.env.dir)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════

/// How a single engine call ended
#[derive(Debug)]
pub enum ApplyOutcome {
    Ok(MigrateApply),
    /// The engine ran and reported a failure
    EngineFailed { message: String },
    /// The call itself did not complete
    CallFailed { error: EngineError },
}

impl ApplyOutcome {
    /// Call errors take priority over the result's own error field
    pub fn classify(result: Result<MigrateApply, EngineError>) -> Self {
        match result {
            Err(error) => Self::CallFailed { error },
            Ok(run) if run.is_failed() => Self::EngineFailed { message: run.error },
            Ok(run) => Self::Ok(run),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Host outputs for this outcome: `error` alone, or all four success keys
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Ok(run) => vec![
                (output::CURRENT, run.current.clone()),
                (output::TARGET, run.target.clone()),
                (output::PENDING_COUNT, run.pending_count().to_string()),
                (output::APPLIED_COUNT, run.applied_count().to_string()),
            ],
            Self::EngineFailed { message } => vec![(output::ERROR, message.clone())],
            Self::CallFailed { error } => vec![(output::ERROR, error.to_string())],
        }
    }

    pub fn into_result(self) -> Result<MigrateApply, ActionError> {
        match self {
            Self::Ok(run) => Ok(run),
            Self::EngineFailed { message } => Err(ActionError::Domain(message)),
            Self::CallFailed { error } => Err(ActionError::Transport(error)),
        }
    }
}
