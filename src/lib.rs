//! atlas-action - CI action adapter for Atlas schema migrations

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod outcome;
pub mod request;
pub mod runner;

pub use config::{ActionConfig, ConfigOverrides};
pub use context::RunContext;
pub use engine::{AtlasCli, ExecutionEngine, MockEngine};
pub use error::{ActionError, EngineError, FixSuggestion, HostError};
pub use host::{GithubHost, HostIo, MemoryHost};
pub use outcome::{ApplyOutcome, AppliedFile, MigrateApply, MigrationFile};
pub use request::MigrateApplyParams;
pub use runner::{migrate_apply, report_failure};
