//! # Migration Engine Abstraction
//!
//! The engine performs the actual `migrate apply`. The action only builds the
//! request and classifies what comes back.
//!
//! - [`ExecutionEngine`] - Core trait, one async method
//! - [`AtlasCli`] - Production engine driving the `atlas` binary
//! - [`MockEngine`] - Test engine with queued results, records requests
//!
//! ## Contract
//!
//! `apply` returns either a structured [`MigrateApply`] (which may itself carry
//! a failure message in `error`) or an [`EngineError`] when the call could not
//! complete. Implementations must return promptly once the [`RunContext`] is
//! done.

mod atlas;
mod mock;

pub use atlas::AtlasCli;
pub use mock::MockEngine;

use async_trait::async_trait;

use crate::context::RunContext;
use crate::error::EngineError;
use crate::outcome::MigrateApply;
use crate::request::MigrateApplyParams;

#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Engine name for logs (e.g. "atlas", "mock")
    fn name(&self) -> &str;

    /// Apply pending migrations
    async fn apply(
        &self,
        ctx: &RunContext,
        params: &MigrateApplyParams,
    ) -> Result<MigrateApply, EngineError>;
}
