//! Mock engine for testing
//!
//! Returns queued results without running any migration.
//! Essential for unit tests and CI pipelines.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ExecutionEngine;
use crate::context::RunContext;
use crate::error::EngineError;
use crate::outcome::MigrateApply;
use crate::request::MigrateApplyParams;

type Reply = Result<MigrateApply, EngineError>;

/// Mock engine that returns predefined results
pub struct MockEngine {
    /// Queue of replies to return (FIFO)
    replies: Arc<Mutex<Vec<Reply>>>,
    /// Track all requests made (for assertions)
    requests: Arc<Mutex<Vec<MigrateApplyParams>>>,
    /// Simulated engine latency, honors the run context
    delay: Option<Duration>,
}

impl MockEngine {
    /// Replies with an empty successful run once the queue is empty
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(vec![])),
            requests: Arc::new(Mutex::new(vec![])),
            delay: None,
        }
    }

    /// Engine that answers with `run`
    pub fn succeeding(run: MigrateApply) -> Self {
        let engine = Self::new();
        engine.queue(Ok(run));
        engine
    }

    /// Engine that fails the call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let engine = Self::new();
        engine.queue(Err(EngineError::Transport(message.into())));
        engine
    }

    /// Wait before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a reply to the queue
    pub fn queue(&self, reply: Reply) {
        self.replies.lock().push(reply);
    }

    /// Get all requests made to this engine
    pub fn requests(&self) -> Vec<MigrateApplyParams> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn apply(
        &self,
        ctx: &RunContext,
        params: &MigrateApplyParams,
    ) -> Result<MigrateApply, EngineError> {
        self.requests.lock().push(params.clone());

        if let Some(delay) = self.delay {
            tokio::select! {
                err = ctx.done() => return Err(err),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let mut queue = self.replies.lock();
        if queue.is_empty() {
            Ok(MigrateApply::default())
        } else {
            queue.remove(0)
        }
    }
}
